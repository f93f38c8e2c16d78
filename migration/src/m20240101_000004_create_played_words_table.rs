use sea_orm_migration::prelude::*;

use crate::m20240101_000001_create_players_table::Players;
use crate::m20240101_000002_create_games_table::Games;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PlayedWords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlayedWords::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PlayedWords::GameId).uuid().not_null())
                    .col(ColumnDef::new(PlayedWords::PlayerId).uuid().not_null())
                    .col(ColumnDef::new(PlayedWords::Word).string().not_null())
                    .col(
                        ColumnDef::new(PlayedWords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_played_words_game")
                            .from(PlayedWords::Table, PlayedWords::GameId)
                            .to(Games::Table, Games::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_played_words_player")
                            .from(PlayedWords::Table, PlayedWords::PlayerId)
                            .to(Players::Table, Players::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // A word can be played once per game
        manager
            .create_index(
                Index::create()
                    .name("idx_played_words_game_word")
                    .table(PlayedWords::Table)
                    .col(PlayedWords::GameId)
                    .col(PlayedWords::Word)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlayedWords::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PlayedWords {
    Table,
    Id,
    GameId,
    PlayerId,
    Word,
    CreatedAt,
}
