//! File Message Store 実装
//!
//! room ごとに JSON Lines 形式の追記専用ログを `{data_dir}/{hex(room)}.jsonl` に保存します。
//! room key はファイル名として安全な 16 進文字列に変換します。
//!
//! id は起動時に既存ログの最大値を読み取り、その続きから採番します。
//! 書き込み途中で途切れた末尾の行は、起動時と各 room へのアクセス時に切り詰めます。
//! 読み取れない行は警告を出して読み飛ばします。

use std::{
    collections::HashMap,
    io::{ErrorKind, SeekFrom},
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicI64, Ordering},
    },
};

use async_trait::async_trait;
use banter_shared::time::Clock;
use tokio::{
    fs,
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
    sync::Mutex,
};

use crate::{
    domain::{Message, MessageId, MessageStore, NewMessage, RoomKey, StoreError},
    infrastructure::dto::record::MessageRecord,
};

const LOG_EXTENSION: &str = "jsonl";

/// Bytes read per step when scanning a log backwards
const TAIL_CHUNK: u64 = 8 * 1024;

pub struct FileMessageStore {
    root: PathBuf,
    clock: Arc<dyn Clock>,
    /// Highest id handed out so far
    last_id: AtomicI64,
    /// Log path per room; its lock serializes access to that file only.
    logs: Mutex<HashMap<RoomKey, Arc<Mutex<PathBuf>>>>,
}

impl FileMessageStore {
    /// Open (or create) a store rooted at `root`.
    pub async fn open(root: impl AsRef<Path>, clock: Arc<dyn Clock>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;

        let mut last_id = 0;
        let mut entries = fs::read_dir(&root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(LOG_EXTENSION) {
                continue;
            }
            truncate_torn_tail(&path).await?;
            for record in read_records(&path).await? {
                last_id = last_id.max(record.id);
            }
        }

        tracing::info!(
            "Message store opened at {} (last id: {})",
            root.display(),
            last_id
        );

        Ok(Self {
            root,
            clock,
            last_id: AtomicI64::new(last_id),
            logs: Mutex::new(HashMap::new()),
        })
    }

    fn room_path(&self, room: &RoomKey) -> PathBuf {
        let encoded: String = room
            .as_str()
            .bytes()
            .map(|byte| format!("{byte:02x}"))
            .collect();
        self.root.join(format!("{encoded}.{LOG_EXTENSION}"))
    }

    async fn room_log(&self, room: &RoomKey) -> Arc<Mutex<PathBuf>> {
        let mut logs = self.logs.lock().await;
        logs.entry(room.clone())
            .or_insert_with(|| Arc::new(Mutex::new(self.room_path(room))))
            .clone()
    }
}

/// Truncate the log after its last newline when it ends in a partial line.
async fn truncate_torn_tail(path: &Path) -> Result<(), StoreError> {
    let mut file = match fs::OpenOptions::new().read(true).write(true).open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    let len = file.metadata().await?.len();
    if len == 0 {
        return Ok(());
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1)).await?;
    file.read_exact(&mut last).await?;
    if last[0] == b'\n' {
        return Ok(());
    }

    let mut content = Vec::new();
    file.seek(SeekFrom::Start(0)).await?;
    file.read_to_end(&mut content).await?;
    let keep = content
        .iter()
        .rposition(|byte| *byte == b'\n')
        .map_or(0, |pos| pos + 1);
    tracing::warn!(
        "Truncating {} torn byte(s) at the end of {}",
        content.len() - keep,
        path.display()
    );
    file.set_len(keep as u64).await?;
    Ok(())
}

fn parse_lines<'a>(path: &Path, lines: impl Iterator<Item = &'a str>) -> Vec<MessageRecord> {
    lines
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str(line) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping unreadable record in {}: {}", path.display(), e);
                None
            }
        })
        .collect()
}

async fn read_records(path: &Path) -> Result<Vec<MessageRecord>, StoreError> {
    let content = match fs::read(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    Ok(parse_lines(path, String::from_utf8_lossy(&content).lines()))
}

/// Read the last `limit` records by scanning the log backwards from its end.
async fn read_tail(path: &Path, limit: usize) -> Result<Vec<MessageRecord>, StoreError> {
    if limit == 0 {
        return Ok(Vec::new());
    }
    let mut file = match fs::File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut pos = file.metadata().await?.len();
    let mut tail: Vec<u8> = Vec::new();
    let mut newlines = 0;
    while pos > 0 && newlines <= limit {
        let step = TAIL_CHUNK.min(pos);
        pos -= step;

        let mut chunk = vec![0; step as usize];
        file.seek(SeekFrom::Start(pos)).await?;
        file.read_exact(&mut chunk).await?;
        newlines += chunk.iter().filter(|byte| **byte == b'\n').count();
        chunk.extend_from_slice(&tail);
        tail = chunk;
    }

    let text = String::from_utf8_lossy(&tail);
    let mut lines = text.lines();
    if pos > 0 {
        // the first line starts somewhere before `pos`
        lines.next();
    }
    let mut records = parse_lines(path, lines);
    let start = records.len().saturating_sub(limit);
    Ok(records.split_off(start))
}

#[async_trait]
impl MessageStore for FileMessageStore {
    async fn append(&self, message: NewMessage) -> Result<Message, StoreError> {
        let log = self.room_log(&message.room).await;
        let path = log.lock().await;
        truncate_torn_tail(&path).await?;

        // the id is taken before any write so an interrupted append never reuses it
        let id = self.last_id.fetch_add(1, Ordering::AcqRel) + 1;
        let persisted = Message::from_new(message, MessageId::new(id), self.clock.now());

        let mut line = serde_json::to_string(&MessageRecord::from(&persisted))?;
        line.push('\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&*path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        Ok(persisted)
    }

    async fn recent(&self, room: &RoomKey, limit: usize) -> Result<Vec<Message>, StoreError> {
        let log = self.room_log(room).await;
        let path = log.lock().await;
        truncate_torn_tail(&path).await?;

        let records = read_tail(&path, limit).await?;
        Ok(records
            .into_iter()
            .filter_map(|record| match Message::try_from(record) {
                Ok(message) => Some(message),
                Err(e) => {
                    tracing::warn!("Skipping invalid record in room '{}': {}", room, e);
                    None
                }
            })
            .collect())
    }
}
