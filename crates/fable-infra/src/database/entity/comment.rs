//! Comment entity for SeaORM. Comments are owned by their post; the
//! foreign key cascade removes them with it.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use fable_core::domain::Comment;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub created_at: DateTimeWithTimeZone,
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

impl From<Model> for Comment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            author_id: model.author_id,
            text: model.text,
            created_at: model.created_at.into(),
        }
    }
}

impl Model {
    pub fn active_model(post_id: Uuid, comment: &Comment) -> ActiveModel {
        ActiveModel {
            id: Set(comment.id),
            post_id: Set(post_id),
            author_id: Set(comment.author_id),
            text: Set(comment.text.clone()),
            created_at: Set(comment.created_at.into()),
        }
    }
}
