//! `SeaORM` active enums mirroring Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "tuition_status")]
#[serde(rename_all = "lowercase")]
pub enum TuitionStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "late")]
    Late,
}

impl From<campus_core::tuition::TuitionStatus> for TuitionStatus {
    fn from(status: campus_core::tuition::TuitionStatus) -> Self {
        use campus_core::tuition::TuitionStatus as Core;
        match status {
            Core::Pending => Self::Pending,
            Core::Paid => Self::Paid,
            Core::Late => Self::Late,
        }
    }
}

impl From<TuitionStatus> for campus_core::tuition::TuitionStatus {
    fn from(status: TuitionStatus) -> Self {
        match status {
            TuitionStatus::Pending => Self::Pending,
            TuitionStatus::Paid => Self::Paid,
            TuitionStatus::Late => Self::Late,
        }
    }
}
