//! Path: native/game_platform/src/event.rs
//! Summary: 同期マルチリスナー通知（Event<T>）— リスナー単位の失敗隔離つき

use std::panic::{catch_unwind, AssertUnwindSafe};

/// リスナー登録時に払い出される識別子。`unlisten` に渡して解除する。
///
/// Rust のクロージャには安定した同一性がないため、リスナーの同一性は
/// この ID で表す（同じ ID が二重登録されることは構造上あり得ない）。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener<T> {
    id:   ListenerId,
    once: bool,
    f:    Box<dyn FnMut(&T)>,
}

/// 同期マルチリスナー通知。
///
/// - 登録順に同期呼び出しする
/// - リスナーのパニックは捕捉してログに残し、残りのリスナーへ配信を続ける
/// - `listen_once` は初回呼び出し後に自動解除される
/// - `clear` はエンティティ破棄時に参照グラフを断つために呼ぶ
pub struct Event<T> {
    next_id:   u64,
    listeners: Vec<Listener<T>>,
}

impl<T> Default for Event<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Event<T> {
    pub fn new() -> Self {
        Self {
            next_id:   0,
            listeners: Vec::new(),
        }
    }

    fn push(&mut self, once: bool, f: Box<dyn FnMut(&T)>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Listener { id, once, f });
        id
    }

    /// リスナーを登録する。解除用の ID を返す
    pub fn listen<F: FnMut(&T) + 'static>(&mut self, f: F) -> ListenerId {
        self.push(false, Box::new(f))
    }

    /// 一度だけ呼ばれるリスナーを登録する。初回配信後に自動解除される
    pub fn listen_once<F: FnMut(&T) + 'static>(&mut self, f: F) -> ListenerId {
        self.push(true, Box::new(f))
    }

    /// ID を指定してリスナーを解除する。存在しなければ false
    pub fn unlisten(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    /// 全リスナーを解除する（エンティティ破棄時に呼ぶ）
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// 登録順に全リスナーを同期呼び出しする。
    ///
    /// 呼び出し前に ID 列をスナップショットするため、once リスナーの
    /// 自動解除が途中で起きても飛ばし・二重呼び出しは発生しない。
    /// パニックしたリスナーは隔離し（ログのみ）、残りへ配信を続ける。
    pub fn trigger(&mut self, payload: &T) {
        let ids: Vec<ListenerId> = self.listeners.iter().map(|l| l.id).collect();
        for id in ids {
            let Some(pos) = self.listeners.iter().position(|l| l.id == id) else {
                continue;
            };
            let once = self.listeners[pos].once;
            let listener = &mut self.listeners[pos].f;
            let result = catch_unwind(AssertUnwindSafe(|| listener(payload)));
            if result.is_err() {
                log::error!("event listener panicked (id={id:?}); delivery continues");
            }
            if once {
                self.unlisten(id);
            }
        }
    }
}
