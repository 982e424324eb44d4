use std::io::{self, Write};

use crate::state::{left_fork, right_fork, ActorState, Phase};

// 状態表の出力先
// StateStore のロックを握ったまま呼ばれるので、行が混ざることはない
pub trait Reporter: Send {
    fn header(&mut self, states: &[ActorState]) -> io::Result<()>;
    fn row(&mut self, states: &[ActorState]) -> io::Result<()>;
    fn footer(&mut self, states: &[ActorState]) -> io::Result<()>;
}

const MIN_FORK_WIDTH: usize = 5;
const PHASE_WIDTH: usize = 7;

// 哲学者の表示名。'A' から ASCII 順に並べる
// ASCII を超える番号は '?' にする
pub fn label(id: usize) -> char {
    u8::try_from(id)
        .ok()
        .and_then(|i| b'A'.checked_add(i))
        .filter(u8::is_ascii)
        .map(char::from)
        .unwrap_or('?')
}

pub fn phase_suffix(phase: Phase) -> &'static str {
    match phase {
        Phase::Eating => " Eat",
        Phase::Thinking => " Think",
        Phase::Changing => " ",
    }
}

// 全フォーク分の '-' を並べ、この哲学者が握っているフォークの位置だけ番号の下一桁にする
pub fn fork_field(id: usize, state: &ActorState, n: usize) -> String {
    let mut buf = vec![b'-'; n];
    if state.holds_left {
        let f = left_fork(id);
        buf[f] = b'0' + (f % 10) as u8;
    }
    if state.holds_right {
        let f = right_fork(id, n);
        buf[f] = b'0' + (f % 10) as u8;
    }
    String::from_utf8(buf).unwrap_or_default()
}

/// 哲学者 1 人を 1 列とする固定幅の状態表を出力する
pub struct TableReporter<W> {
    out: W,
    n: usize,
    fork_width: usize,
}

impl<W: Write + Send> TableReporter<W> {
    pub fn new(out: W, n: usize) -> Self {
        TableReporter {
            out,
            n,
            fork_width: n.max(MIN_FORK_WIDTH),
        }
    }

    fn cell_width(&self) -> usize {
        self.fork_width + PHASE_WIDTH
    }

    pub fn border(&self) -> String {
        let mut s = String::from("|");
        for _ in 0..self.n {
            s.push_str(&"=".repeat(self.cell_width() + 1));
            s.push('|');
        }
        s
    }

    pub fn labels(&self) -> String {
        let mut s = String::from("| ");
        for i in 0..self.n {
            s.push(label(i));
            s.push_str(&" ".repeat(self.cell_width() - 1));
            s.push_str("| ");
        }
        s
    }

    pub fn render(&self, states: &[ActorState]) -> String {
        let mut s = String::from("| ");
        for (id, state) in states.iter().enumerate() {
            s.push_str(&format!(
                "{:<fw$}{:<pw$}| ",
                fork_field(id, state, self.n),
                phase_suffix(state.phase),
                fw = self.fork_width,
                pw = PHASE_WIDTH,
            ));
        }
        s
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Reporter for TableReporter<W> {
    fn header(&mut self, states: &[ActorState]) -> io::Result<()> {
        let border = self.border();
        writeln!(self.out, "{border}")?;
        writeln!(self.out, "{}", self.labels())?;
        writeln!(self.out, "{border}")?;
        // 最初の行: 全員 Changing でフォークなし
        writeln!(self.out, "{}", self.render(states))?;
        self.out.flush()
    }

    fn row(&mut self, states: &[ActorState]) -> io::Result<()> {
        writeln!(self.out, "{}", self.render(states))?;
        self.out.flush()
    }

    fn footer(&mut self, _states: &[ActorState]) -> io::Result<()> {
        writeln!(self.out, "{}", self.border())?;
        self.out.flush()
    }
}
