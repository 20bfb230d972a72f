/// Declare a string-backed enum with `as_str`, `FromStr` and a list of accepted values
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const VALUES: &'static [&'static str] = &[$($text),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::database::models::ParseEnumError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok($name::$variant),)+
                    other => Err($crate::database::models::ParseEnumError {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use string_enum;

pub mod accounting;
pub mod hr;
pub mod inventory;
pub mod production;
pub mod project;
pub mod purchase;
pub mod sales;
pub mod user;

pub use accounting::{Account, AccountType, EntryStatus, JournalEntry, JournalLine};
pub use hr::{Department, Employee};
pub use inventory::{Product, Warehouse};
pub use production::{WorkOrder, WorkOrderStatus};
pub use project::{Project, ProjectStatus};
pub use purchase::Supplier;
pub use sales::{Customer, OrderLine, OrderStatus, SalesOrder};
pub use user::User;

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

string_enum! {
    /// Lifecycle flag shared by master-data records
    RecordStatus, "status" {
        Active => "active",
        Inactive => "inactive",
    }
}

impl Default for RecordStatus {
    fn default() -> Self {
        RecordStatus::Active
    }
}
