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
                    .table(GamesPlayers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GamesPlayers::GameId).uuid().not_null())
                    .col(ColumnDef::new(GamesPlayers::PlayerId).uuid().not_null())
                    .col(ColumnDef::new(GamesPlayers::Ordering).integer().not_null())
                    .col(
                        ColumnDef::new(GamesPlayers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(GamesPlayers::GameId)
                            .col(GamesPlayers::PlayerId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_games_players_game")
                            .from(GamesPlayers::Table, GamesPlayers::GameId)
                            .to(Games::Table, Games::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_games_players_player")
                            .from(GamesPlayers::Table, GamesPlayers::PlayerId)
                            .to(Players::Table, Players::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // A slot is handed out once per game
        manager
            .create_index(
                Index::create()
                    .name("idx_games_players_ordering")
                    .table(GamesPlayers::Table)
                    .col(GamesPlayers::GameId)
                    .col(GamesPlayers::Ordering)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_games_players_player_id")
                    .table(GamesPlayers::Table)
                    .col(GamesPlayers::PlayerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GamesPlayers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum GamesPlayers {
    Table,
    GameId,
    PlayerId,
    Ordering,
    CreatedAt,
}
