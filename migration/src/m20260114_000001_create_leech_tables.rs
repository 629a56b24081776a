use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create leech_file table
        manager
            .create_table(
                Table::create()
                    .table(LeechFile::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(LeechFile::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(LeechFile::Link).string().not_null())
                    .col(ColumnDef::new(LeechFile::ActualLink).string())
                    .col(ColumnDef::new(LeechFile::Token).string())
                    .col(ColumnDef::new(LeechFile::Tool).string().not_null())
                    .col(ColumnDef::new(LeechFile::Status).string().not_null())
                    .col(ColumnDef::new(LeechFile::UploadStatus).string().not_null())
                    .col(ColumnDef::new(LeechFile::SyncTool).string())
                    .col(ColumnDef::new(LeechFile::SyncPath).string())
                    .col(ColumnDef::new(LeechFile::Name).string())
                    .col(ColumnDef::new(LeechFile::Reason).string())
                    .col(ColumnDef::new(LeechFile::UploadReason).string())
                    .col(ColumnDef::new(LeechFile::RemoteFolder).string())
                    .col(ColumnDef::new(LeechFile::Location).string())
                    .col(ColumnDef::new(LeechFile::Size).big_integer())
                    .col(ColumnDef::new(LeechFile::ContentHash).string())
                    .col(
                        ColumnDef::new(LeechFile::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(LeechFile::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_leech_file_content_hash")
                    .table(LeechFile::Table)
                    .col(LeechFile::ContentHash)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_leech_file_status")
                    .table(LeechFile::Table)
                    .col(LeechFile::Status)
                    .col(LeechFile::UploadStatus)
                    .to_owned(),
            )
            .await?;

        // Create leech_task table
        manager
            .create_table(
                Table::create()
                    .table(LeechTask::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(LeechTask::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(LeechTask::JobId).uuid().not_null())
                    .col(ColumnDef::new(LeechTask::FileId).uuid().not_null())
                    .col(ColumnDef::new(LeechTask::Phase).string().not_null())
                    .col(ColumnDef::new(LeechTask::Status).string().not_null())
                    .col(
                        ColumnDef::new(LeechTask::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(LeechTask::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_leech_task_job_id")
                    .table(LeechTask::Table)
                    .col(LeechTask::JobId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_leech_task_status_phase")
                    .table(LeechTask::Table)
                    .col(LeechTask::Status)
                    .col(LeechTask::Phase)
                    .to_owned(),
            )
            .await?;

        // Create leech_message table
        manager
            .create_table(
                Table::create()
                    .table(LeechMessage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LeechMessage::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LeechMessage::Phase).string().not_null())
                    .col(ColumnDef::new(LeechMessage::FileId).uuid().not_null())
                    .col(ColumnDef::new(LeechMessage::Content).text().not_null())
                    .col(ColumnDef::new(LeechMessage::Status).string().not_null())
                    .col(ColumnDef::new(LeechMessage::FileStatus).string().not_null())
                    .col(
                        ColumnDef::new(LeechMessage::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(LeechMessage::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_leech_message_status")
                    .table(LeechMessage::Table)
                    .col(LeechMessage::Status)
                    .to_owned(),
            )
            .await?;

        // Create worker table, hostname is the natural key
        manager
            .create_table(
                Table::create()
                    .table(Worker::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Worker::Hostname)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Worker::Queue).string().not_null())
                    .col(ColumnDef::new(Worker::Status).string().not_null())
                    .col(ColumnDef::new(Worker::Concurrency).integer().not_null())
                    .col(ColumnDef::new(Worker::RateLimit).json())
                    .col(ColumnDef::new(Worker::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Create queue_job table
        manager
            .create_table(
                Table::create()
                    .table(QueueJob::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(QueueJob::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(QueueJob::Queue).string().not_null())
                    .col(ColumnDef::new(QueueJob::FileId).uuid().not_null())
                    .col(ColumnDef::new(QueueJob::Phase).string().not_null())
                    .col(ColumnDef::new(QueueJob::Chain).json().not_null())
                    .col(ColumnDef::new(QueueJob::Status).string().not_null())
                    .col(ColumnDef::new(QueueJob::LockToken).string())
                    .col(ColumnDef::new(QueueJob::LockExpiresAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(QueueJob::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(QueueJob::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_queue_job_queue_status")
                    .table(QueueJob::Table)
                    .col(QueueJob::Queue)
                    .col(QueueJob::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(QueueJob::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Worker::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LeechMessage::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LeechTask::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LeechFile::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum LeechFile {
    Table,
    Id,
    Link,
    ActualLink,
    Token,
    Tool,
    Status,
    UploadStatus,
    SyncTool,
    SyncPath,
    Name,
    Reason,
    UploadReason,
    RemoteFolder,
    Location,
    Size,
    ContentHash,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LeechTask {
    Table,
    Id,
    JobId,
    FileId,
    Phase,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LeechMessage {
    Table,
    Id,
    Phase,
    FileId,
    Content,
    Status,
    FileStatus,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Worker {
    Table,
    Hostname,
    Queue,
    Status,
    Concurrency,
    RateLimit,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum QueueJob {
    Table,
    Id,
    Queue,
    FileId,
    Phase,
    Chain,
    Status,
    LockToken,
    LockExpiresAt,
    CreatedAt,
    UpdatedAt,
}
