use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "games")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub current_player_order: i32,
    pub number_of_players: i32,
    /// `CREATED`, `ONGOING` or `END`.
    pub state: String,
    pub board_base: Vec<u8>,
    pub board_positioning: Vec<u8>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::games_players::Entity")]
    GamesPlayers,
    #[sea_orm(has_many = "super::played_words::Entity")]
    PlayedWords,
}

impl Related<super::games_players::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GamesPlayers.def()
    }
}

impl Related<super::played_words::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlayedWords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
