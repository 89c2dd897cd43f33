//! Data models representing ledger entities and API payloads.

/// Implements the textual code mapping of a fieldless enum: `as_str`,
/// `Display`, `FromStr`, and the sqlx traits that store it in a TEXT column.
macro_rules! text_codes {
    ($name:ident { $($variant:ident => $code:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $code,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::error::AppError;

            fn from_str(code: &str) -> Result<Self, Self::Err> {
                match code {
                    $($code => Ok($name::$variant),)+
                    other => Err(crate::error::AppError::Internal(format!(
                        "unknown {} code '{}'",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }

        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let code = <&str as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
                Ok(code.parse()?)
            }
        }

        impl sqlx::Encode<'_, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }
    };
}

/// Money accounts and their derived balances
pub mod account;
/// Financial adjustments and their dimensions
pub mod adjustment;
/// Currency exchanges between money accounts
pub mod exchange;
/// Fixed-point rounding helpers
pub mod money;
/// Sales and expenses
pub mod obligation;
/// Payment transactions, lines and applications
pub mod payment;

use serde::{Deserialize, Serialize};

/// Lifecycle of payment transactions, exchanges and adjustments.
///
/// Records are created `ACTIVE`; voiding is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordState {
    Active,
    Voided,
}

text_codes!(RecordState {
    Active => "ACTIVE",
    Voided => "VOIDED",
});
