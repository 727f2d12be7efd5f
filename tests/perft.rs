/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Reference node counts from <https://www.chessprogramming.org/Perft_Results>
//! and <https://www.chessprogramming.net/perfect-perft/>.
//!
//! Only depths that cannot reach an underpromotion are used, since pawns always promote to a queen here.

use rotor::{perft_generic, Position, FEN_KIWIPETE, FEN_STARTPOS};

fn test_perft_fen_nodes(depth: usize, fen: &str, expected: u64) {
    let position: Position = fen.parse().unwrap();
    let res = perft_generic::<true, false>(&position, depth);
    assert_eq!(res, expected, "PERFT({depth}) failed on {fen}");
}

#[cfg(test)]
mod startpos_perft {
    use super::*;

    #[test]
    fn test_startpos_perft_1() {
        test_perft_fen_nodes(1, FEN_STARTPOS, 20);
    }

    #[test]
    fn test_startpos_perft_2() {
        test_perft_fen_nodes(2, FEN_STARTPOS, 400);
    }

    #[test]
    fn test_startpos_perft_3() {
        test_perft_fen_nodes(3, FEN_STARTPOS, 8902);
    }

    #[test]
    fn test_startpos_perft_4() {
        test_perft_fen_nodes(4, FEN_STARTPOS, 197281);
    }
}

#[cfg(test)]
mod kiwipete_perft {
    use super::*;

    #[test]
    fn test_kiwipete_perft_1() {
        test_perft_fen_nodes(1, FEN_KIWIPETE, 48);
    }

    #[test]
    fn test_kiwipete_perft_2() {
        test_perft_fen_nodes(2, FEN_KIWIPETE, 2039);
    }

    #[test]
    fn test_kiwipete_perft_3() {
        test_perft_fen_nodes(3, FEN_KIWIPETE, 97862);
    }

    /// Kiwipete with colors swapped: the same tree, searched from Black's rotated board.
    #[test]
    fn test_mirrored_kiwipete_perft() {
        let fen = "r3k2r/pppbbppp/2n2q1P/1P2p3/3pn3/BN2PNP1/P1PPQPB1/R3K2R b KQkq - 0 1";
        test_perft_fen_nodes(1, fen, 48);
        test_perft_fen_nodes(2, fen, 2039);
    }
}

#[cfg(test)]
mod simple_perfts {
    use super::*;

    #[test]
    fn test_position_3_perft() {
        let fen = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - -";
        test_perft_fen_nodes(1, fen, 14);
        test_perft_fen_nodes(2, fen, 191);
        test_perft_fen_nodes(3, fen, 2812);
        test_perft_fen_nodes(4, fen, 43238);
    }

    #[test]
    fn test_position_4_perft_1() {
        test_perft_fen_nodes(
            1,
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            6,
        );
        test_perft_fen_nodes(
            1,
            "r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1",
            6,
        );
    }

    #[test]
    fn test_position_5_perft_1_queen_promotions_only() {
        // 44 with underpromotions; d7xc8 is the only promotion, and three of its four versions are not generated
        test_perft_fen_nodes(
            1,
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            41,
        );
    }

    #[test]
    fn test_rook_endgame_perft() {
        test_perft_fen_nodes(5, "1k6/1b6/8/8/7R/8/8/4K2R b K - 0 1", 1063513);
    }
}

#[cfg(test)]
mod special_perfts {
    use super::*;

    #[test]
    fn test_special_perft_short_castling_gives_check() {
        test_perft_fen_nodes(6, "5k2/8/8/8/8/8/8/4K2R w K - 0 1", 661072);
    }

    #[test]
    fn test_special_perft_long_castling_gives_check() {
        test_perft_fen_nodes(6, "3k4/8/8/8/8/8/8/R3K3 w Q - 0 1", 803711);
    }

    #[test]
    fn test_special_perft_castling_rights() {
        test_perft_fen_nodes(4, "r3k2r/1b4bq/8/8/8/8/7B/R3K2R w KQkq - 0 1", 1274206);
    }

    #[test]
    fn test_special_perft_castling_prevented() {
        test_perft_fen_nodes(4, "r3k2r/8/3Q4/8/8/5q2/8/R3K2R b KQkq - 0 1", 1720476);
    }
}
