//! Request and response models for the cloud management APIs

pub mod budget;
pub mod dashboard;
pub mod metric;

pub use budget::{
    BillingInfo, Budget, BudgetAmount, BudgetFilter, BudgetKind, Money, NotificationsRule,
    SpendBasis, ThresholdRule, DEFAULT_SERVICES, THRESHOLD_PERCENTS, VERTEX_AI_SERVICE,
};
pub use dashboard::{extract_user_metric, Dashboard, LayoutSummary, Tile, Widget, WidgetKind};
pub use metric::{
    LogEntry, LogMetric, LogMetricDescriptor, MetricDescriptor, MetricKind, TimeInterval,
    TimeSeries, ValueType, USER_METRIC_PREFIX,
};
