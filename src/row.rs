use indexmap::IndexMap;

pub const DATE_LISTED: &str = "Date Listed";
pub const LINK: &str = "Link";
pub const HIDDEN_ID: &str = "Hidden ID";
pub const PRODUCT_CODE: &str = "Product Code";
pub const VENDOR_SKU: &str = "Vendor SKU";
pub const TITLE: &str = "Title";
pub const LIST_PRICE: &str = "List Price";
pub const PER: &str = "Per";
pub const STATUS: &str = "Status";

/// `strftime` pattern of the `Date Listed` column.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// One report line, column name to cell. An empty cell is a null.
pub type Record = IndexMap<String, String>;

/// Natural key of a report line: (`Product Code`, `Date Listed`).
pub type RowKey = (String, String);

/// Flattened result of one product fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputRow {
    pub date_listed: String,
    pub link: String,
    pub hidden_id: String,
    pub product_code: Option<String>,
    pub vendor_sku: Option<String>,
    pub title: Option<String>,
    pub list_price: Option<String>,
    pub per: Option<String>,
    pub status: Option<String>,
    /// Values of `category_1..category_N`, in order.
    pub categories: Vec<String>,
}

impl OutputRow {
    pub fn key(&self) -> Option<RowKey> {
        self.product_code
            .as_ref()
            .map(|code| (code.clone(), self.date_listed.clone()))
    }

    pub fn to_record(&self) -> Record {
        let cell = |v: &Option<String>| v.clone().unwrap_or_default();

        let mut record = Record::new();
        record.insert(DATE_LISTED.to_string(), self.date_listed.clone());
        record.insert(LINK.to_string(), self.link.clone());
        record.insert(HIDDEN_ID.to_string(), self.hidden_id.clone());
        record.insert(PRODUCT_CODE.to_string(), cell(&self.product_code));
        record.insert(VENDOR_SKU.to_string(), cell(&self.vendor_sku));
        record.insert(TITLE.to_string(), cell(&self.title));
        record.insert(LIST_PRICE.to_string(), cell(&self.list_price));
        record.insert(PER.to_string(), cell(&self.per));
        record.insert(STATUS.to_string(), cell(&self.status));
        for (idx, category) in self.categories.iter().enumerate() {
            record.insert(category_column(idx + 1), category.clone());
        }
        record
    }
}

pub fn category_column(n: usize) -> String {
    format!("category_{n}")
}

/// Category labels from a breadcrumb trail: the first crumb (home) and the
/// last (the product itself) are dropped.
pub fn categories_from_crumbs(crumbs: &[String]) -> Vec<String> {
    if crumbs.len() <= 2 {
        return Vec::new();
    }
    crumbs[1..crumbs.len() - 1].to_vec()
}

/// Key of a stored record, if it has a non-empty value in both key columns.
pub fn record_key(record: &Record) -> Option<RowKey> {
    let code = record.get(PRODUCT_CODE).filter(|v| !v.is_empty())?;
    let date = record.get(DATE_LISTED).filter(|v| !v.is_empty())?;
    Some((code.clone(), date.clone()))
}
