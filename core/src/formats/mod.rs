//! Format adapters, one per supported source extract

pub mod call_detail;
pub mod involvement_report;
pub mod subscriber_registry;
pub mod transaction;

pub use call_detail::CallDetailAdapter;
pub use involvement_report::InvolvementReportAdapter;
pub use subscriber_registry::SubscriberRegistryAdapter;
pub use transaction::TransactionExtractAdapter;

use crate::config::IngestConfig;
use crate::traits::FormatAdapter;
use crate::types::SourceFormat;

/// Select the adapter for a source format
pub fn adapter_for(format: SourceFormat, config: &IngestConfig) -> Box<dyn FormatAdapter> {
    match format {
        SourceFormat::TransactionExtract => Box::new(TransactionExtractAdapter::new(&config.sentinel)),
        SourceFormat::CallDetail => Box::new(CallDetailAdapter::new(&config.sentinel)),
        SourceFormat::SubscriberRegistry => Box::new(SubscriberRegistryAdapter::new(
            &config.sentinel,
            &config.non_person_marker,
        )),
        SourceFormat::InvolvementReport => Box::new(InvolvementReportAdapter::new(&config.sentinel)),
    }
}
