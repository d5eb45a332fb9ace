//! Shared domain enums stored as text columns

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Implements string conversions and the sqlx text encoding for an enum whose
/// variants map one-to-one onto fixed strings.
macro_rules! text_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($ty::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($ty), s)),
                }
            }
        }

        impl sqlx::Type<sqlx::Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $ty {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl sqlx::Encode<'_, sqlx::Postgres> for $ty {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Application-level role of a signed-in user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Supervisor,
}

text_enum!(Role {
    Admin => "admin",
    Supervisor => "supervisor",
});

// ---------------------------------------------------------------------------
// EquipmentStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum EquipmentStatus {
    #[serde(rename = "available")]
    Available,
    #[serde(rename = "in use")]
    InUse,
    #[serde(rename = "transferring")]
    Transferring,
}

text_enum!(EquipmentStatus {
    Available => "available",
    InUse => "in use",
    Transferring => "transferring",
});

impl Default for EquipmentStatus {
    fn default() -> Self {
        EquipmentStatus::Available
    }
}

// ---------------------------------------------------------------------------
// RequestType
// ---------------------------------------------------------------------------

/// Kind of equipment request a supervisor sends to the admins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Buy,
    Sell,
    Rent,
    Return,
}

text_enum!(RequestType {
    Buy => "buy",
    Sell => "sell",
    Rent => "rent",
    Return => "return",
});

impl RequestType {
    /// Whether approving this request adds stock to the site. Only buy
    /// does; sell, rent and return all draw down an existing row.
    pub fn adds_stock(&self) -> bool {
        matches!(self, RequestType::Buy)
    }
}

// ---------------------------------------------------------------------------
// RequestStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

text_enum!(RequestStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

// ---------------------------------------------------------------------------
// TransferStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

text_enum!(TransferStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
    Cancelled => "cancelled",
});

impl TransferStatus {
    pub fn is_final(&self) -> bool {
        !matches!(self, TransferStatus::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" supervisor ".parse::<Role>().unwrap(), Role::Supervisor);
        assert!("guest".parse::<Role>().is_err());
    }

    #[test]
    fn test_equipment_status_text_matches_serde() {
        for status in [
            EquipmentStatus::Available,
            EquipmentStatus::InUse,
            EquipmentStatus::Transferring,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(status.as_str().parse::<EquipmentStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_request_type_stock_direction() {
        assert!(RequestType::Buy.adds_stock());
        assert!(!RequestType::Rent.adds_stock());
        assert!(!RequestType::Sell.adds_stock());
        assert!(!RequestType::Return.adds_stock());
    }

    #[test]
    fn test_transfer_status_final() {
        assert!(!TransferStatus::Pending.is_final());
        assert!(TransferStatus::Approved.is_final());
        assert!(TransferStatus::Cancelled.is_final());
    }
}
