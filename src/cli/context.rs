use anyhow::anyhow;
use tracing::debug;

use crate::api::HttpBackend;
use crate::catalog::{self, Resource};
use crate::config::{self, AppConfig};
use crate::crud::CrudModule;
use crate::dates::local_offset;
use crate::guard::{self, Navigation, LOGIN_PATH};
use crate::session::Session;

/// Everything a command needs: config, the stored session and a backend
pub struct Context {
    pub config: &'static AppConfig,
    pub session: Session,
}

impl Context {
    pub fn load() -> anyhow::Result<Self> {
        let config = config::config();
        debug!(
            "Using {} config, API at {}",
            config.environment.name(),
            config.api.base_url
        );
        Ok(Self {
            config,
            session: Session::open_default()?,
        })
    }

    /// Run the route guard for `path`; anything but `Allow` is an error
    pub fn require(&self, path: &str) -> anyhow::Result<()> {
        match guard::resolve(path, &self.session) {
            Navigation::Allow(_) => Ok(()),
            Navigation::Redirect { to, .. } if to == LOGIN_PATH => Err(anyhow!(
                "Not logged in. Run 'dealer auth login <email>' first"
            )),
            Navigation::Redirect { to, .. } => Err(anyhow!("Redirected to {}", to)),
            Navigation::NotFound(path) => Err(anyhow!("No page at {}", path)),
        }
    }

    pub fn backend(&self) -> anyhow::Result<HttpBackend> {
        Ok(HttpBackend::from_config(self.config)?)
    }

    /// Guarded CRUD screen for a resource slug
    pub fn module(&self, slug: &str) -> anyhow::Result<CrudModule<HttpBackend>> {
        let resource = resolve_resource(slug)?;
        self.require(&resource.route())?;
        Ok(CrudModule::new(resource, self.backend()?, self.offset()))
    }

    pub fn offset(&self) -> chrono::FixedOffset {
        local_offset(self.config.locale.tz_offset_minutes)
    }
}

pub fn resolve_resource(slug: &str) -> anyhow::Result<&'static Resource> {
    catalog::find(slug).ok_or_else(|| {
        let known: Vec<&str> = catalog::all().iter().map(|r| r.slug).collect();
        anyhow!("Unknown resource '{}'. Available: {}", slug, known.join(", "))
    })
}
