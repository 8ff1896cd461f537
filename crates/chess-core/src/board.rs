//! Rules oracle used to replay answers: FEN setup, lenient SAN resolution,
//! move application and mate detection, backed by shakmaty.

use std::sync::LazyLock;

use regex::Regex;
use shakmaty::fen::Fen;
use shakmaty::{
    CastlingMode, CastlingSide, Chess, Color, File, Move, Position, PositionError, Rank, Role, Square,
};
use thiserror::Error;

static SAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([NBKRQ])?([a-h])?([1-8])?[\-x]?([a-h][1-8])(=?[nbrqkNBRQK])?[\+#]?$")
        .expect("san pattern")
});

const KING_SIDE: &[&str] = &["O-O", "O-O+", "O-O#", "0-0", "0-0+", "0-0#"];
const QUEEN_SIDE: &[&str] = &["O-O-O", "O-O-O+", "O-O-O#", "0-0-0", "0-0-0+", "0-0-0#"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("Invalid position '{fen}': {reason}")]
    InvalidPosition { fen: String, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("Invalid SAN '{0}'")]
    InvalidSan(String),

    #[error("Illegal move '{0}'")]
    Illegal(String),

    #[error("Ambiguous move '{0}'")]
    Ambiguous(String),
}

/// The operations a classifier needs from a chess rules engine.
pub trait RulesOracle: Sized {
    type Move;

    /// Build a position from FEN.
    fn from_fen(fen: &str) -> Result<Self, BoardError>;

    /// Resolve a move in algebraic notation against the current position.
    /// Must not change the position.
    fn resolve(&self, san: &str) -> Result<Self::Move, MoveError>;

    /// Play a move previously returned by `resolve`.
    fn apply(&mut self, mv: &Self::Move);

    fn is_checkmate(&self) -> bool;

    fn turn(&self) -> Color;
}

/// A shakmaty position being replayed move by move.
#[derive(Debug, Clone)]
pub struct ReplayBoard {
    pos: Chess,
}

impl ReplayBoard {
    pub fn position(&self) -> &Chess {
        &self.pos
    }

    fn castle(&self, side: CastlingSide, san: &str) -> Result<Move, MoveError> {
        self.pos
            .legal_moves()
            .into_iter()
            .find(|m| m.castling_side() == Some(side))
            .ok_or_else(|| MoveError::Illegal(san.to_string()))
    }
}

/// Square the king lands on for castles, the target square otherwise.
fn destination(m: &Move) -> Square {
    match m {
        Move::Castle { king, rook } => {
            let file = if rook.file() > king.file() { File::G } else { File::C };
            Square::from_coords(file, king.rank())
        }
        _ => m.to(),
    }
}

impl RulesOracle for ReplayBoard {
    type Move = Move;

    fn from_fen(fen: &str) -> Result<Self, BoardError> {
        let parsed: Fen = fen.trim().parse().map_err(|e: shakmaty::fen::ParseFenError| {
            BoardError::InvalidFen {
                fen: fen.to_string(),
                reason: e.to_string(),
            }
        })?;

        let pos: Chess = parsed
            .into_position(CastlingMode::Standard)
            .or_else(PositionError::ignore_invalid_castling_rights)
            .or_else(PositionError::ignore_too_much_material)
            .or_else(PositionError::ignore_impossible_check)
            .map_err(|e| BoardError::InvalidPosition {
                fen: fen.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self { pos })
    }

    fn resolve(&self, san: &str) -> Result<Move, MoveError> {
        if KING_SIDE.contains(&san) {
            return self.castle(CastlingSide::KingSide, san);
        }
        if QUEEN_SIDE.contains(&san) {
            return self.castle(CastlingSide::QueenSide, san);
        }

        let caps = SAN_RE
            .captures(san)
            .ok_or_else(|| MoveError::InvalidSan(san.to_string()))?;

        let to = parse_square(&caps[4]);
        let promotion = caps.get(5).and_then(|p| p.as_str().chars().last()).and_then(role_from_char);
        let from_file = caps.get(2).map(|f| file_from_byte(f.as_str().as_bytes()[0]));
        let from_rank = caps.get(3).map(|r| rank_from_byte(r.as_str().as_bytes()[0]));
        let role = caps.get(1).and_then(|r| r.as_str().chars().next()).and_then(role_from_char);

        let own_target = self.pos.board().color_at(to) == Some(self.pos.turn());

        let legals = self.pos.legal_moves();

        // Fully specified origin without a piece letter: any piece, castling included,
        // written either with the king's target square or the rook's square.
        if role.is_none() {
            if let (Some(file), Some(rank)) = (from_file, from_rank) {
                let from = Square::from_coords(file, rank);
                return legals
                    .iter()
                    .find(|m| {
                        m.from() == Some(from)
                            && (destination(m) == to || m.to() == to)
                            && m.promotion() == promotion
                    })
                    .cloned()
                    .ok_or_else(|| MoveError::Illegal(san.to_string()));
            }
        }

        if own_target {
            return Err(MoveError::Illegal(san.to_string()));
        }

        let mut matched: Option<&Move> = None;
        for m in legals.iter() {
            if destination(m) != to || m.promotion() != promotion {
                continue;
            }
            let Some(from) = m.from() else { continue };

            let role_ok = match role {
                Some(role) => m.role() == role && !m.is_castle(),
                // Pawn moves only; without an origin file the pawn stays on its file.
                None => m.role() == Role::Pawn && (from_file.is_some() || from.file() == to.file()),
            };
            if !role_ok
                || from_file.is_some_and(|f| from.file() != f)
                || from_rank.is_some_and(|r| from.rank() != r)
            {
                continue;
            }

            if matched.is_some() {
                return Err(MoveError::Ambiguous(san.to_string()));
            }
            matched = Some(m);
        }

        matched
            .cloned()
            .ok_or_else(|| MoveError::Illegal(san.to_string()))
    }

    fn apply(&mut self, mv: &Move) {
        self.pos.play_unchecked(mv.clone());
    }

    fn is_checkmate(&self) -> bool {
        self.pos.is_checkmate()
    }

    fn turn(&self) -> Color {
        self.pos.turn()
    }
}

fn parse_square(name: &str) -> Square {
    let bytes = name.as_bytes();
    Square::from_coords(file_from_byte(bytes[0]), rank_from_byte(bytes[1]))
}

fn file_from_byte(b: u8) -> File {
    File::new(u32::from(b - b'a'))
}

fn rank_from_byte(b: u8) -> Rank {
    Rank::new(u32::from(b - b'1'))
}

fn role_from_char(c: char) -> Option<Role> {
    match c.to_ascii_lowercase() {
        'p' => Some(Role::Pawn),
        'n' => Some(Role::Knight),
        'b' => Some(Role::Bishop),
        'r' => Some(Role::Rook),
        'q' => Some(Role::Queen),
        'k' => Some(Role::King),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    const CASTLE_READY: &str = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";

    fn board(fen: &str) -> ReplayBoard {
        ReplayBoard::from_fen(fen).unwrap()
    }

    #[test]
    fn test_from_fen_rejects_garbage() {
        assert!(matches!(
            ReplayBoard::from_fen("not a fen"),
            Err(BoardError::InvalidFen { .. })
        ));
        // No kings
        assert!(matches!(
            ReplayBoard::from_fen("8/8/8/8/8/8/8/8 w - - 0 1"),
            Err(BoardError::InvalidPosition { .. })
        ));
    }

    #[test]
    fn test_from_fen_tolerates_stale_castling_rights() {
        // Castling rights without rooks on their home squares
        let b = board("4k3/8/8/8/8/8/8/4K3 w KQkq - 0 1");
        assert_eq!(b.turn(), Color::White);
        assert!(matches!(b.resolve("O-O"), Err(MoveError::Illegal(_))));
        assert!(b.resolve("Kd2").is_ok());
    }

    #[test]
    fn test_resolve_pawn_and_piece_moves() {
        let b = board(START);
        assert_eq!(b.resolve("e4").unwrap().to(), Square::E4);
        assert_eq!(b.resolve("Nf3").unwrap().from(), Some(Square::G1));
        assert_eq!(b.resolve("Nf3+").unwrap().from(), Some(Square::G1));
        assert!(matches!(b.resolve("e5"), Err(MoveError::Illegal(_))));
        assert!(matches!(b.resolve("Qh5"), Err(MoveError::Illegal(_))));
        assert!(matches!(b.resolve("hello"), Err(MoveError::InvalidSan(_))));
        assert!(matches!(b.resolve("--"), Err(MoveError::InvalidSan(_))));
    }

    #[test]
    fn test_resolve_long_algebraic() {
        let b = board(START);
        assert_eq!(b.resolve("e2e4").unwrap().to(), Square::E4);
        assert_eq!(b.resolve("g1-f3").unwrap().role(), Role::Knight);
    }

    #[test]
    fn test_resolve_does_not_mutate() {
        let b = board(START);
        b.resolve("e4").unwrap();
        assert_eq!(b.turn(), Color::White);
        assert_eq!(b.position().board(), Chess::default().board());
    }

    #[test]
    fn test_resolve_castling() {
        let b = board(CASTLE_READY);
        assert_eq!(
            b.resolve("O-O").unwrap().castling_side(),
            Some(CastlingSide::KingSide)
        );
        assert_eq!(
            b.resolve("0-0-0").unwrap().castling_side(),
            Some(CastlingSide::QueenSide)
        );
        assert_eq!(
            b.resolve("e1g1").unwrap().castling_side(),
            Some(CastlingSide::KingSide)
        );
        assert!(matches!(board(START).resolve("O-O"), Err(MoveError::Illegal(_))));
    }

    #[test]
    fn test_resolve_king_onto_own_rook_castles() {
        let b = board(CASTLE_READY);
        assert_eq!(
            b.resolve("e1h1").unwrap().castling_side(),
            Some(CastlingSide::KingSide)
        );
        assert_eq!(
            b.resolve("e1a1").unwrap().castling_side(),
            Some(CastlingSide::QueenSide)
        );
        // Only the origin-qualified form; a bare rook square is still an own piece
        assert!(matches!(b.resolve("Kh1"), Err(MoveError::Illegal(_))));
    }

    #[test]
    fn test_apply_castle_moves_king_and_rook() {
        let mut b = board(CASTLE_READY);
        let mv = b.resolve("e1h1").unwrap();
        b.apply(&mv);
        assert_eq!(b.turn(), Color::Black);
        assert_eq!(b.position().board().role_at(Square::G1), Some(Role::King));
        assert_eq!(b.position().board().role_at(Square::F1), Some(Role::Rook));
        assert_eq!(b.position().board().role_at(Square::H1), None);
    }

    #[test]
    fn test_resolve_ambiguous_and_disambiguated() {
        // Rooks on a1 and h1 can both reach d1
        let b = board("4k3/8/8/8/8/8/4K3/R6R w - - 0 1");
        assert!(matches!(b.resolve("Rd1"), Err(MoveError::Ambiguous(_))));
        assert_eq!(b.resolve("Rad1").unwrap().from(), Some(Square::A1));
        assert_eq!(b.resolve("Rhf1").unwrap().from(), Some(Square::H1));
    }

    #[test]
    fn test_resolve_promotion() {
        let b = board("8/P3k3/8/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(b.resolve("a8=Q").unwrap().promotion(), Some(Role::Queen));
        assert_eq!(b.resolve("a8N").unwrap().promotion(), Some(Role::Knight));
        assert!(matches!(b.resolve("a8"), Err(MoveError::Illegal(_))));
    }

    #[test]
    fn test_pawn_capture_needs_file() {
        let b = board("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1");
        assert_eq!(b.resolve("exd5").unwrap().to(), Square::D5);
        assert_eq!(b.resolve("ed5").unwrap().to(), Square::D5);
        assert!(b.resolve("d5").is_err());
    }

    #[test]
    fn test_apply_and_checkmate() {
        let mut b = board(START);
        for san in ["f3", "e5", "g4", "Qh4#"] {
            let mv = b.resolve(san).unwrap();
            b.apply(&mv);
        }
        assert!(b.is_checkmate());
        assert_eq!(b.turn(), Color::White);
    }
}
