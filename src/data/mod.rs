use std::fs;
use std::io::Cursor;
use std::path::Path;

use bincode::ErrorKind;
use thiserror::Error;

use crate::graph::board::Board;

/// Compression level used when encoding board snapshots.
///
/// Snapshots are written once and read many times, so the slow, tight end of
/// the zstd range is the right trade.
const BOARD_COMPRESSION_LEVEL: i32 = 19;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] Box<ErrorKind>),
    #[error("Compression error: {0}")]
    Compression(#[source] std::io::Error),
}

pub fn serialize_board(board: &Board) -> Result<Vec<u8>, DataError> {
    let encoded = bincode::serialize(board)?;
    let mut cursor = Cursor::new(encoded);
    zstd::stream::encode_all(&mut cursor, BOARD_COMPRESSION_LEVEL).map_err(DataError::Compression)
}

pub fn deserialize_board(bytes: &[u8]) -> Result<Board, DataError> {
    let mut cursor = Cursor::new(bytes);
    let decoded = zstd::stream::decode_all(&mut cursor).map_err(DataError::Compression)?;
    let mut board: Board = bincode::deserialize(&decoded)?;
    board.rebuild_indices();
    Ok(board)
}

pub fn write_board_to_file<P: AsRef<Path>>(board: &Board, path: P) -> Result<(), DataError> {
    let bytes = serialize_board(board)?;
    fs::write(path, bytes)?;
    Ok(())
}

pub fn read_board_from_file<P: AsRef<Path>>(path: P) -> Result<Board, DataError> {
    let bytes = fs::read(path)?;
    deserialize_board(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::generate;
    use crate::CRASHED_PLANET_NAME;

    #[test]
    fn snapshot_survives_a_file_round_trip() {
        let board = generate(21).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.bin");
        write_board_to_file(&board, &path).unwrap();

        let loaded = read_board_from_file(&path).unwrap();
        assert_eq!(loaded.seed(), 21);
        assert_eq!(loaded.nodes(), board.nodes());
        assert_eq!(loaded.edge_count(), board.edge_count());
        assert_eq!(loaded.target_id(), board.target_id());
        // The name index is rebuilt on load.
        assert_eq!(
            loaded.node_by_name(CRASHED_PLANET_NAME).map(|n| n.id()),
            Some(board.target_id())
        );
    }

    #[test]
    fn garbage_is_a_compression_error() {
        assert!(matches!(
            deserialize_board(b"definitely not zstd"),
            Err(DataError::Compression(_))
        ));
    }
}
