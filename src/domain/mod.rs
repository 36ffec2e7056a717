pub mod key;
pub mod labels;
pub mod pull_request;
pub mod ticket;
