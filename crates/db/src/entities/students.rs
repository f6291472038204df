//! `SeaORM` Entity for students table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub birth_date: Option<Date>,
    pub responsible_id: Uuid,
    pub class_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::responsibles::Entity",
        from = "Column::ResponsibleId",
        to = "super::responsibles::Column::Id"
    )]
    Responsibles,
    #[sea_orm(
        belongs_to = "super::school_classes::Entity",
        from = "Column::ClassId",
        to = "super::school_classes::Column::Id"
    )]
    SchoolClasses,
    #[sea_orm(has_many = "super::tuitions::Entity")]
    Tuitions,
}

impl Related<super::responsibles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Responsibles.def()
    }
}

impl Related<super::school_classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SchoolClasses.def()
    }
}

impl Related<super::tuitions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tuitions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
