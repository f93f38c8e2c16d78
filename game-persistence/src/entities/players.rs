use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "players")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub username: String,
    #[sea_orm(unique)]
    pub device_fingerprint: String,
    pub session_expires_at: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::games_players::Entity")]
    GamesPlayers,
}

impl Related<super::games_players::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GamesPlayers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
