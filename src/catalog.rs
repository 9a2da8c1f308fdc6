//! Resource definitions for every screen of the console.
//!
//! Each resource is one REST collection with a flat record shape. The field
//! list drives form drafts, table output and CSV export.

use serde::Serialize;
use serde_json::{Map, Value};

/// A record as the backend returns it
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "options", rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Date,
    /// URL of an uploaded image, stored as a plain string
    Image,
    Select(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Resource {
    pub slug: &'static str,
    pub name: &'static str,
    pub path: &'static str,
    pub fields: &'static [Field],
}

impl Resource {
    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Route the console shows this resource under
    pub fn route(&self) -> String {
        format!("/admin/{}", self.slug)
    }
}

/// Server-assigned identifier, `_id` first and `id` as fallback
pub fn record_id(record: &Record) -> Option<String> {
    ["_id", "id"].iter().find_map(|key| match record.get(*key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

pub fn find(slug: &str) -> Option<&'static Resource> {
    RESOURCES.iter().find(|r| r.slug == slug)
}

pub fn all() -> &'static [Resource] {
    RESOURCES
}

const fn text(name: &'static str, label: &'static str, required: bool) -> Field {
    Field { name, label, kind: FieldKind::Text, required }
}

const fn number(name: &'static str, label: &'static str, required: bool) -> Field {
    Field { name, label, kind: FieldKind::Number, required }
}

const fn date(name: &'static str, label: &'static str, required: bool) -> Field {
    Field { name, label, kind: FieldKind::Date, required }
}

const fn image(name: &'static str, label: &'static str) -> Field {
    Field { name, label, kind: FieldKind::Image, required: false }
}

const fn select(
    name: &'static str,
    label: &'static str,
    options: &'static [&'static str],
    required: bool,
) -> Field {
    Field { name, label, kind: FieldKind::Select(options), required }
}

const PAYMENT_MODES: &[&str] = &["Cash", "UPI", "Cheque", "Bank Transfer", "Finance"];
const STOCK_STATUS: &[&str] = &["In Stock", "Sold", "Reserved"];
const SERVICE_STATUS: &[&str] = &["Pending", "In Progress", "Completed", "Delivered"];

static RESOURCES: &[Resource] = &[
    Resource {
        slug: "purchase-invoices",
        name: "Purchase Invoices",
        path: "/api/purchase-invoices",
        fields: &[
            text("invoiceNumber", "Invoice No.", true),
            date("invoiceDate", "Invoice Date", true),
            text("supplierName", "Supplier", true),
            text("itemName", "Item", true),
            text("model", "Model", false),
            text("serialNumber", "Serial No.", false),
            number("quantity", "Qty", false),
            number("amount", "Amount", true),
        ],
    },
    Resource {
        slug: "sales-invoices",
        name: "Sales Invoices",
        path: "/api/sales-invoices",
        fields: &[
            text("invoiceNumber", "Invoice No.", true),
            date("invoiceDate", "Invoice Date", true),
            text("customerName", "Customer", true),
            text("mobileNumber", "Mobile", false),
            text("itemName", "Item", true),
            text("model", "Model", false),
            text("chassisNumber", "Chassis No.", false),
            number("amount", "Amount", true),
            number("gstAmount", "GST", false),
        ],
    },
    Resource {
        slug: "erickshaw-sales",
        name: "E-Rickshaw Sales",
        path: "/api/erickshaw-sales",
        fields: &[
            text("customerName", "Customer", true),
            text("mobileNumber", "Mobile", true),
            text("address", "Address", false),
            date("saleDate", "Sale Date", true),
            text("model", "Model", true),
            text("chassisNumber", "Chassis No.", true),
            text("motorNumber", "Motor No.", false),
            text("batteryType", "Battery", false),
            number("price", "Price", true),
            select("paymentMode", "Payment Mode", PAYMENT_MODES, false),
        ],
    },
    Resource {
        slug: "erickshaw-stock",
        name: "E-Rickshaw Stock",
        path: "/api/erickshaw-stock",
        fields: &[
            text("model", "Model", true),
            text("colour", "Colour", false),
            text("chassisNumber", "Chassis No.", true),
            text("motorNumber", "Motor No.", false),
            text("controllerNumber", "Controller No.", false),
            date("arrivalDate", "Arrival Date", false),
            select("status", "Status", STOCK_STATUS, false),
        ],
    },
    Resource {
        slug: "battery-sales",
        name: "Battery Sales",
        path: "/api/battery-sales",
        fields: &[
            text("customerName", "Customer", true),
            text("mobileNumber", "Mobile", false),
            date("saleDate", "Sale Date", true),
            text("batteryBrand", "Brand", true),
            text("batteryModel", "Model", false),
            text("serialNumber", "Serial No.", false),
            number("warrantyMonths", "Warranty (months)", false),
            number("price", "Price", true),
        ],
    },
    Resource {
        slug: "battery-services",
        name: "Battery Service",
        path: "/api/battery-services",
        fields: &[
            text("customerName", "Customer", true),
            text("mobileNumber", "Mobile", false),
            date("serviceDate", "Service Date", true),
            text("batterySerialNumber", "Battery Serial No.", false),
            text("complaint", "Complaint", true),
            text("serviceDone", "Service Done", false),
            number("charges", "Charges", false),
            select("status", "Status", SERVICE_STATUS, false),
        ],
    },
    Resource {
        slug: "battery-stock",
        name: "Battery Stock",
        path: "/api/battery-stock",
        fields: &[
            text("brand", "Brand", true),
            text("model", "Model", false),
            text("serialNumber", "Serial No.", true),
            number("capacityAh", "Capacity (Ah)", false),
            date("arrivalDate", "Arrival Date", false),
            select("status", "Status", STOCK_STATUS, false),
        ],
    },
    Resource {
        slug: "spares-stock",
        name: "Spares Stock",
        path: "/api/spares-stock",
        fields: &[
            text("partName", "Part", true),
            text("partNumber", "Part No.", false),
            text("category", "Category", false),
            number("quantity", "Qty", true),
            number("unitPrice", "Unit Price", false),
            text("supplierName", "Supplier", false),
        ],
    },
    Resource {
        slug: "spares-sales",
        name: "Spares & Services",
        path: "/api/spares-sales",
        fields: &[
            text("customerName", "Customer", true),
            date("saleDate", "Date", true),
            text("partName", "Part / Service", true),
            number("quantity", "Qty", false),
            number("unitPrice", "Unit Price", false),
            number("totalAmount", "Total", true),
        ],
    },
    Resource {
        slug: "job-cards",
        name: "Job Cards",
        path: "/api/job-cards",
        fields: &[
            text("jobCardNumber", "Job Card No.", true),
            text("customerName", "Customer", true),
            text("mobileNumber", "Mobile", false),
            text("vehicleNumber", "Vehicle No.", false),
            text("chassisNumber", "Chassis No.", false),
            date("receivedDate", "Received", true),
            text("complaint", "Complaint", true),
            text("mechanicName", "Mechanic", false),
            number("estimatedCost", "Estimate", false),
            select("status", "Status", SERVICE_STATUS, false),
        ],
    },
    Resource {
        slug: "quotations",
        name: "Quotations",
        path: "/api/quotations",
        fields: &[
            text("quotationNumber", "Quotation No.", true),
            date("quotationDate", "Date", true),
            text("customerName", "Customer", true),
            text("mobileNumber", "Mobile", false),
            text("model", "Model", true),
            number("price", "Price", true),
            date("validTill", "Valid Till", false),
            text("remarks", "Remarks", false),
        ],
    },
    Resource {
        slug: "loan-details",
        name: "Loan Details",
        path: "/api/loan-details",
        fields: &[
            text("customerName", "Customer", true),
            text("mobileNumber", "Mobile", false),
            text("chassisNumber", "Chassis No.", true),
            text("financer", "Financer", true),
            number("loanAmount", "Loan Amount", true),
            number("downPayment", "Down Payment", false),
            number("emiAmount", "EMI", false),
            number("tenureMonths", "Tenure (months)", false),
            date("disbursementDate", "Disbursed On", false),
            select("status", "Status", &["Applied", "Approved", "Disbursed", "Closed", "Rejected"], false),
        ],
    },
    Resource {
        slug: "payment-details",
        name: "Payment Details",
        path: "/api/payment-details",
        fields: &[
            text("customerName", "Customer", true),
            date("paymentDate", "Date", true),
            number("amount", "Amount", true),
            select("paymentMode", "Mode", PAYMENT_MODES, true),
            text("referenceNumber", "Reference", false),
            text("purpose", "Purpose", false),
        ],
    },
    Resource {
        slug: "emi-collections",
        name: "EMI Collections",
        path: "/api/emi-collections",
        fields: &[
            text("customerName", "Customer", true),
            text("chassisNumber", "Chassis No.", false),
            date("dueDate", "Due Date", true),
            number("emiAmount", "EMI", true),
            number("paidAmount", "Paid", false),
            date("paidDate", "Paid On", false),
            select("status", "Status", &["Due", "Paid", "Overdue"], false),
        ],
    },
    Resource {
        slug: "customers",
        name: "Customers",
        path: "/api/customers",
        fields: &[
            text("name", "Name", true),
            text("mobileNumber", "Mobile", true),
            text("email", "Email", false),
            text("address", "Address", false),
            text("aadharNumber", "Aadhar No.", false),
            image("photoUrl", "Photo"),
        ],
    },
    Resource {
        slug: "suppliers",
        name: "Suppliers",
        path: "/api/suppliers",
        fields: &[
            text("name", "Name", true),
            text("contactPerson", "Contact", false),
            text("mobileNumber", "Mobile", true),
            text("gstNumber", "GSTIN", false),
            text("address", "Address", false),
        ],
    },
    Resource {
        slug: "financers",
        name: "Financers",
        path: "/api/financers",
        fields: &[
            text("name", "Name", true),
            text("contactPerson", "Contact", false),
            text("mobileNumber", "Mobile", false),
            text("branch", "Branch", false),
            number("interestRate", "Interest %", false),
        ],
    },
    Resource {
        slug: "team",
        name: "Team Management",
        path: "/api/team",
        fields: &[
            text("name", "Name", true),
            select("role", "Role", &["Sales", "Mechanic", "Accounts", "Manager"], true),
            text("mobileNumber", "Mobile", true),
            text("email", "Email", false),
            date("joiningDate", "Joined", false),
            number("salary", "Salary", false),
            image("photoUrl", "Photo"),
        ],
    },
    Resource {
        slug: "attendance",
        name: "Attendance",
        path: "/api/attendance",
        fields: &[
            text("employeeName", "Employee", true),
            date("date", "Date", true),
            select("status", "Status", &["Present", "Absent", "Half Day", "Leave"], true),
            text("checkIn", "Check In", false),
            text("checkOut", "Check Out", false),
            text("remarks", "Remarks", false),
        ],
    },
    Resource {
        slug: "expenses",
        name: "Expenses",
        path: "/api/expenses",
        fields: &[
            date("expenseDate", "Date", true),
            text("category", "Category", true),
            text("description", "Description", false),
            number("amount", "Amount", true),
            text("paidTo", "Paid To", false),
            select("paymentMode", "Mode", PAYMENT_MODES, false),
        ],
    },
];
