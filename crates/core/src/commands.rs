use anyhow::Result;
use tracing::info;

use crate::config::AppConfig;
use crate::model::DeleteResult;
use crate::services::Board;

/// Open the board persisted under the configured data directory.
pub fn open_board(config: &AppConfig) -> Result<Board> {
    Board::from_config(config)
}

/// Delete the tasks with the provided ids and return per-id results.
pub fn delete_tasks(config: &AppConfig, ids: &[u64]) -> Result<Vec<DeleteResult>> {
    let mut board = open_board(config)?;
    let results: Vec<DeleteResult> = ids
        .iter()
        .map(|&id| DeleteResult {
            id,
            deleted: board.delete_task(id),
        })
        .collect();
    info!(
        requested = ids.len(),
        deleted = results.iter().filter(|result| result.deleted).count(),
        "delete command finished"
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskDraft;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn delete_reports_each_id_and_persists() {
        let dir = TempDir::new().expect("temp dir");
        let config = AppConfig::from_data_dir(dir.path().to_path_buf()).expect("config");

        let id = {
            let mut board = open_board(&config).expect("open board");
            board.add_task(TaskDraft::new("Short lived")).id
        };

        let results = delete_tasks(&config, &[id, 7_777]).expect("delete");
        assert_eq!(results.len(), 2);
        assert!(results[0].deleted);
        assert!(!results[1].deleted);

        let board = open_board(&config).expect("reopen board");
        assert!(board.task(id).is_none());
    }
}
