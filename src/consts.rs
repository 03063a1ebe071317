/// Standard date format used throughout the codebase: "2025-01-15"
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fallback description for records without one
pub(crate) const UNKNOWN: &str = "Unknown";

/// Default currency unit appended to cost strings by the form API
pub(crate) const DEFAULT_CURRENCY: &str = "EUR";

/// Label of the combined group produced from all cost dimensions
pub(crate) const TOTAL_LABEL: &str = "Total Cost";

/// Upstream field names of the maintenance form
pub(crate) mod fields {
    pub(crate) const ID: &str = "_id";
    pub(crate) const DESCRIPTION: &str = "Loco_Description";
    pub(crate) const DUE_DATE: &str = "Next_Due_Date";
    pub(crate) const WORK_ORDER: &str = "WO_Number";
    pub(crate) const PM_DESCRIPTION: &str = "PM_Description";
    pub(crate) const FREE_TEXT: &str = "Description";
    pub(crate) const TOTAL_BUDGET: &str = "Total_Budget";
    pub(crate) const LABOR_COST: &str = "Estimated_Labor_Cost";
    pub(crate) const TOOL_COST: &str = "Estimated_Tool_Cost";
    pub(crate) const SERVICE_COST: &str = "Estimated_Service_Cost";
    pub(crate) const ITEM_COST: &str = "Estimated_Item_Cost";
    /// Set on records that came from the service-event form
    pub(crate) const SERVICE_FLAG: &str = "service";
}

/// Upstream field names of the service-event form
pub(crate) mod service_fields {
    pub(crate) const LOCOMOTIVE: &str = "Locomotive_Number";
    pub(crate) const NAME: &str = "Name";
    pub(crate) const PLAN_START: &str = "Plan_Start";
    pub(crate) const EVENT_SERVICE: &str = "Event_Service";
}

/// Upstream field names of the wheelset measurement form
pub(crate) mod wheelset_fields {
    /// Locomotive lookup; flattened into `Name`, `Homologation_Date` and
    /// `Locomotive_Number`
    pub(crate) const LOCOMOTIVE: &str = "Locomotive_Number";
    pub(crate) const NAME: &str = "Name";
    pub(crate) const HOMOLOGATION_DATE: &str = "Homologation_Date";
    /// Work-order lookup; flattened into the two fields below
    pub(crate) const WORK_ORDER: &str = "Work_Order";
    pub(crate) const WORK_ORDER_NUMBER_SOURCE: &str = "wonum";
    pub(crate) const WORK_ORDER_NAME: &str = "Work_Order_Name";
    pub(crate) const WORK_ORDER_NUMBER: &str = "Work_Order_Number";
}
