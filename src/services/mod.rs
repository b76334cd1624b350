//! Service layer: clients for the external APIs the handlers talk to.
//!
//! Each client sits behind a trait so handlers can run against fakes:
//! - Content API (`ContentSource`)
//! - Search index (`SearchIndex`)
//! - News search (`NewsSource`)
//! - Transactional email (`Mailer`)
//! - Pub/sub relay (`Publisher`)

mod content;
mod mail;
mod news;
mod pubsub;
mod search;

pub use content::{ContentApiClient, ContentSource};
pub use mail::{Mailer, SendGridClient, TemplateMail};
pub use news::{NewsApiClient, NewsQuery, NewsSource};
pub use pubsub::{HttpPublisher, Publisher};
pub use search::{AlgoliaClient, SearchIndex};
