use crate::models::activity::NewActivity;
use crate::store::postgres::PgStore;

/// Async activity writer. Fires off a Tokio task to insert the record
/// without blocking the response path. Failures are logged and swallowed.
pub fn log_async(db: PgStore, activity: NewActivity) {
    tokio::spawn(async move {
        match db.insert_activity(&activity).await {
            Ok(row) => tracing::debug!(id = %row.id, "activity recorded"),
            Err(e) => {
                tracing::error!(user_id = %activity.user_id, "failed to record activity: {}", e)
            }
        }
    });
}

/// Awaited activity writer for paths that need read-your-write consistency.
/// Failures are still logged and swallowed — recording never fails a request.
pub async fn log_sync(db: &PgStore, activity: NewActivity) {
    if let Err(e) = db.insert_activity(&activity).await {
        tracing::error!(user_id = %activity.user_id, "failed to record activity: {}", e);
    }
}
