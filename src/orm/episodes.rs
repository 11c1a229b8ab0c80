//! SeaORM Entity for episodes table
//!
//! (series_id, episode_number, status) is the natural key used by the
//! episode upsert.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Audio track of an episode release.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(8))")]
pub enum EpisodeStatus {
    #[sea_orm(string_value = "Sub")]
    Sub,
    #[sea_orm(string_value = "Dub")]
    Dub,
}

impl Default for EpisodeStatus {
    fn default() -> Self {
        EpisodeStatus::Sub
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "episodes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub series_id: i32,
    pub episode_number: i32,
    pub release_date: Option<Date>,
    pub hash_code: Option<String>,
    pub status: EpisodeStatus,
    /// Runtime in minutes.
    pub duration: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::series::Entity",
        from = "Column::SeriesId",
        to = "super::series::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Series,
    #[sea_orm(has_many = "super::likes::Entity")]
    Likes,
    #[sea_orm(has_many = "super::comments::Entity")]
    Comments,
}

impl Related<super::series::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Series.def()
    }
}

impl Related<super::likes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Likes.def()
    }
}

impl Related<super::comments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
