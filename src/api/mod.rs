pub mod error;
pub mod leave;

use crate::db::{MySqlApplicationStore, MySqlUserDirectory};
use crate::workflow::LeaveWorkflow;

pub type AppWorkflow = LeaveWorkflow<MySqlApplicationStore, MySqlUserDirectory>;
