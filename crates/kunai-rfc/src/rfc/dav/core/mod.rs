//! `WebDAV` XML types.
//!
//! This module defines the core types for `WebDAV` XML elements
//! used in `PROPFIND`, `REPORT`, and multistatus responses.

mod depth;
mod href;
mod multistatus;
mod namespace;
mod partial_retrieval;
mod precondition;
mod property;
mod propfind;
mod report;

pub use depth::Depth;
pub use href::Href;
pub use multistatus::{Multistatus, Propstat, PropstatResponse, ResponseBody, Status};
pub use namespace::{
    CALDAV_NS, CARDDAV_NS, CS_NS, DAV_NS, Namespace, QName, caldav_props, carddav_props, cs_props,
    dav_props,
};
pub use partial_retrieval::{
    AddressDataRequest, CalendarDataRequest, CompSelection, ComponentSelection, PropSelection,
    RecurrenceDirective,
};
pub use precondition::Precondition;
pub use property::{DavProperty, PropertyName, PropertyValue};
pub use propfind::{PropfindRequest, PropfindType};
pub use report::{
    AddressbookFilter, AddressbookQuery, CalendarQuery, CompFilter, CompFilterTest,
    ExpandProperty, ExpandPropertyItem, FilterTest, FreeBusyQuery, MatchType, Multiget,
    ParamFilter, ParamFilterTest, PropFilter, PropFilterTest, ReportRequest, ReportScope,
    ReportType, SyncCollection, SyncLevel, TextMatch, TimeRange, TimeRangeFilter,
};
