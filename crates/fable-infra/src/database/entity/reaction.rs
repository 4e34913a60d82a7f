//! Post reaction entity for SeaORM.
//!
//! The composite primary key (post_id, user_id) enforces at the schema
//! level that a user holds at most one reaction per post.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use fable_core::domain::ReactionKind;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "post_reactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub post_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    pub kind: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn active_model(post_id: Uuid, user_id: Uuid, kind: ReactionKind) -> ActiveModel {
        ActiveModel {
            post_id: Set(post_id),
            user_id: Set(user_id),
            kind: Set(kind.to_string()),
        }
    }
}
