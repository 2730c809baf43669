pub mod contract;
pub mod proposal;
pub mod rfp;
pub mod user;
