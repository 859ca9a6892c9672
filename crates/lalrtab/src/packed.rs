//! The packed row encoding of the parse tables, as consumed by table-driven
//! parser runtimes.
//!
//! An action row is a sequence of `(terminal, code)` pairs closed by `-1`
//! and the code of the default action. A code is `0` for an error,
//! `state + 1` for a shift and `-(production + 1)` for a reduction.
//! A reduce-goto row is a sequence of `(nonterminal, state)` pairs closed by
//! `-1, -1`.

use crate::{
    automaton::StateID,
    error::InternalError,
    grammar::{NonterminalID, ProductionID, TerminalID},
    table::{ActionTable, ParseAction, ReduceGotoTable},
};

const END_OF_ROW: i32 = -1;
const ERROR_CODE: i32 = 0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PackedAction {
    Error,
    Shift(StateID),
    Reduce(ProductionID),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedTables {
    pub action_rows: Vec<Vec<i32>>,
    pub reduce_rows: Vec<Vec<i32>>,
    pub start_state: StateID,
    pub start_production: ProductionID,
}

impl PackedTables {
    /// Encode the dense tables.
    ///
    /// Error cells are left out. When a row has a default reduction, cells
    /// reducing by it are left out too, and non-associative error cells are
    /// written explicitly so that they do not fall through to the default.
    pub fn pack(
        actions: &ActionTable,
        gotos: &ReduceGotoTable,
        start_state: StateID,
        start_production: ProductionID,
    ) -> Result<Self, InternalError> {
        let mut action_rows = Vec::with_capacity(actions.rows.len());
        for row in &actions.rows {
            let mut words = vec![];
            for (t, action) in row.actions.iter().enumerate() {
                let code = match *action {
                    ParseAction::Error => continue,
                    ParseAction::Shift(next) => shift_code(next),
                    ParseAction::Reduce(p) if Some(p) == row.default_reduce => continue,
                    ParseAction::Reduce(p) => reduce_code(p),
                    ParseAction::NonAssoc if row.default_reduce.is_some() => ERROR_CODE,
                    ParseAction::NonAssoc => continue,
                };
                words.push(to_word(t)?);
                words.push(code);
            }
            words.push(END_OF_ROW);
            words.push(row.default_reduce.map_or(ERROR_CODE, reduce_code));
            action_rows.push(words);
        }

        let mut reduce_rows = Vec::with_capacity(gotos.rows.len());
        for row in &gotos.rows {
            let mut words = vec![];
            for (n, goto) in row.iter().enumerate() {
                if let Some(goto) = goto {
                    words.push(to_word(n)?);
                    words.push(i32::from(goto.into_raw()));
                }
            }
            words.push(END_OF_ROW);
            words.push(END_OF_ROW);
            reduce_rows.push(words);
        }

        Ok(Self {
            action_rows,
            reduce_rows,
            start_state,
            start_production,
        })
    }

    /// The action taken in `state` on `t`, falling back to the row default.
    ///
    /// In a row with a default reduction, a terminal that is an error in the
    /// dense table reduces by the default instead. The error is then detected
    /// after the reduction, before any further shift, so the accepted input is
    /// unchanged. Only non-associative cells stay explicit errors.
    pub fn action(&self, state: StateID, t: TerminalID) -> Result<PackedAction, InternalError> {
        let row = self
            .action_rows
            .get(state.index())
            .ok_or(InternalError::UnknownState(state))?;
        let tag = i32::from(t.into_raw());
        for pair in row.chunks(2) {
            match *pair {
                [END_OF_ROW, code] => return decode_action(code),
                [key, code] if key == tag => return decode_action(code),
                [_, _] => continue,
                _ => break,
            }
        }
        Err(malformed("action row without terminator"))
    }

    /// The state entered from `state` after reducing to `n`.
    pub fn goto(&self, state: StateID, n: NonterminalID) -> Result<Option<StateID>, InternalError> {
        let row = self
            .reduce_rows
            .get(state.index())
            .ok_or(InternalError::UnknownState(state))?;
        let tag = i32::from(n.into_raw());
        for pair in row.chunks(2) {
            match *pair {
                [END_OF_ROW, _] => return Ok(None),
                [key, next] if key == tag => return to_state(next).map(Some),
                [_, _] => continue,
                _ => break,
            }
        }
        Err(malformed("reduce row without terminator"))
    }

    /// Productions that no action row ever reduces by, explicitly or as its
    /// default, in index order.
    pub fn unreduced_productions(
        &self,
        num_productions: usize,
    ) -> Result<Vec<ProductionID>, InternalError> {
        let mut reduced = vec![false; num_productions];
        for row in &self.action_rows {
            for pair in row.chunks(2) {
                if let [_, code] = *pair {
                    if let PackedAction::Reduce(p) = decode_action(code)? {
                        let flag = reduced
                            .get_mut(p.index())
                            .ok_or(InternalError::UnknownProduction(p))?;
                        *flag = true;
                    }
                }
            }
        }
        let mut unreduced = vec![];
        for (i, reduced) in reduced.into_iter().enumerate() {
            if !reduced {
                let raw = u16::try_from(i).map_err(|_| malformed("production index out of range"))?;
                unreduced.push(ProductionID::from_raw(raw));
            }
        }
        Ok(unreduced)
    }

    /// Flatten into one word sequence: the row counts, the start state and
    /// production, then every row prefixed with its length.
    pub fn encode(&self) -> Vec<i32> {
        let mut words = vec![
            self.action_rows.len() as i32,
            self.reduce_rows.len() as i32,
            i32::from(self.start_state.into_raw()),
            i32::from(self.start_production.into_raw()),
        ];
        for row in self.action_rows.iter().chain(&self.reduce_rows) {
            words.push(row.len() as i32);
            words.extend_from_slice(row);
        }
        words
    }

    pub fn decode(words: &[i32]) -> Result<Self, InternalError> {
        let mut words = words.iter().copied();
        let mut next = |what: &str| {
            words
                .next()
                .ok_or_else(|| malformed(&format!("unexpected end of input while reading {}", what)))
        };

        let num_action_rows = to_len(next("the header")?)?;
        let num_reduce_rows = to_len(next("the header")?)?;
        let start_state = to_state(next("the header")?)?;
        let start_production = u16::try_from(next("the header")?)
            .map(ProductionID::from_raw)
            .map_err(|_| malformed("start production out of range"))?;

        let num_rows = num_action_rows
            .checked_add(num_reduce_rows)
            .ok_or_else(|| malformed("too many rows"))?;
        let mut rows = vec![];
        for _ in 0..num_rows {
            let len = to_len(next("a row length")?)?;
            if len < 2 || len % 2 != 0 {
                return Err(malformed("row length must be a positive even number"));
            }
            let mut row = vec![];
            for _ in 0..len {
                row.push(next("a row")?);
            }
            if row[len - 2] != END_OF_ROW {
                return Err(malformed("row without terminator"));
            }
            rows.push(row);
        }
        if next("trailing words").is_ok() {
            return Err(malformed("trailing words after the last row"));
        }

        let reduce_rows = rows.split_off(num_action_rows);
        if start_state.index() >= num_action_rows {
            return Err(malformed("start state out of range"));
        }
        Ok(Self {
            action_rows: rows,
            reduce_rows,
            start_state,
            start_production,
        })
    }
}

fn shift_code(next: StateID) -> i32 {
    i32::from(next.into_raw()) + 1
}

fn reduce_code(p: ProductionID) -> i32 {
    -(i32::from(p.into_raw()) + 1)
}

fn decode_action(code: i32) -> Result<PackedAction, InternalError> {
    Ok(match code {
        ERROR_CODE => PackedAction::Error,
        code if code > 0 => PackedAction::Shift(to_state(code - 1)?),
        code => {
            let raw = u16::try_from(-(i64::from(code) + 1))
                .map_err(|_| malformed("reduce code out of range"))?;
            PackedAction::Reduce(ProductionID::from_raw(raw))
        }
    })
}

fn to_word(index: usize) -> Result<i32, InternalError> {
    i32::try_from(index).map_err(|_| malformed("symbol index out of range"))
}

fn to_len(word: i32) -> Result<usize, InternalError> {
    usize::try_from(word).map_err(|_| malformed("negative length"))
}

fn to_state(word: i32) -> Result<StateID, InternalError> {
    u16::try_from(word)
        .map(StateID::from_raw)
        .map_err(|_| malformed("state index out of range"))
}

fn malformed(msg: &str) -> InternalError {
    InternalError::MalformedPackedTable { msg: msg.into() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        automaton::Automaton,
        diagnostics::Diagnostics,
        grammar::{Assoc, Grammar, SymbolID::*},
        table::build_tables,
    };

    fn expr_grammar() -> Grammar {
        Grammar::define(|def| {
            let plus = def.terminal("PLUS", None)?;
            let lt = def.terminal("LT", None)?;
            let num = def.terminal("NUM", None)?;
            def.precedence(Assoc::Nonassoc, [lt])?;
            def.precedence(Assoc::Left, [plus])?;
            let e = def.nonterminal("e")?;
            def.rule(e, [N(e), T(plus), N(e)], None)?;
            def.rule(e, [N(e), T(lt), N(e)], None)?;
            def.rule(e, [T(num)], None)?;
            Ok(())
        })
        .unwrap()
    }

    fn tables(g: &Grammar, compact: bool) -> (ActionTable, ReduceGotoTable) {
        let automaton = Automaton::build(g).unwrap();
        let (mut actions, gotos, _) = build_tables(g, &automaton, &mut Diagnostics::new()).unwrap();
        if compact {
            actions.compact();
        }
        (actions, gotos)
    }

    fn expected(action: ParseAction, default: Option<ProductionID>) -> PackedAction {
        match action {
            ParseAction::Shift(next) => PackedAction::Shift(next),
            ParseAction::Reduce(p) => PackedAction::Reduce(p),
            ParseAction::NonAssoc => PackedAction::Error,
            ParseAction::Error => default.map_or(PackedAction::Error, PackedAction::Reduce),
        }
    }

    #[test]
    fn lookup_matches_dense_tables() {
        let g = expr_grammar();
        for compact in [false, true] {
            let (actions, gotos) = tables(&g, compact);
            let packed =
                PackedTables::pack(&actions, &gotos, StateID::START, ProductionID::START).unwrap();

            for (i, row) in actions.rows.iter().enumerate() {
                let state = StateID::from_raw(i as u16);
                for t in g.terminals.keys() {
                    let dense = row.get(*t).unwrap();
                    assert_eq!(
                        packed.action(state, *t).unwrap(),
                        expected(dense, row.default_reduce),
                        "{:?} on {:?} (compact = {})",
                        state,
                        t,
                        compact
                    );
                }
                for n in g.nonterminals.keys() {
                    assert_eq!(packed.goto(state, *n).unwrap(), gotos.goto(state, *n));
                }
            }
        }
    }

    #[test]
    fn nonassoc_cells_survive_compaction() {
        let g = expr_grammar();
        let (actions, gotos) = tables(&g, true);
        let lt = g.terminal_by_name("LT").unwrap();
        let (i, row) = actions
            .rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.get(lt) == Some(ParseAction::NonAssoc))
            .unwrap();
        assert!(row.default_reduce.is_some());

        let packed = PackedTables::pack(&actions, &gotos, StateID::START, ProductionID::START).unwrap();
        let words = &packed.action_rows[i];
        let lt_word = i32::from(lt.into_raw());
        assert!(words.chunks(2).any(|pair| pair == [lt_word, 0]));
        assert_eq!(
            packed.action(StateID::from_raw(i as u16), lt).unwrap(),
            PackedAction::Error
        );
    }

    #[test]
    fn error_cells_fall_through_to_default() {
        let g = expr_grammar();
        let (actions, gotos) = tables(&g, true);
        let num = g.terminal_by_name("NUM").unwrap();
        let (i, row) = actions
            .rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.default_reduce.is_some() && row.get(num) == Some(ParseAction::Error))
            .unwrap();
        let default = row.default_reduce.unwrap();

        let packed = PackedTables::pack(&actions, &gotos, StateID::START, ProductionID::START).unwrap();
        assert_eq!(
            packed.action(StateID::from_raw(i as u16), num).unwrap(),
            PackedAction::Reduce(default)
        );
    }

    #[test]
    fn row_layout() {
        let p = ProductionID::from_raw;
        let mut actions = ActionTable {
            rows: vec![crate::table::ActionRow::new(4)],
        };
        actions.rows[0].actions[1] = ParseAction::Shift(StateID::from_raw(2));
        actions.rows[0].actions[2] = ParseAction::Reduce(p(3));
        actions.rows[0].actions[3] = ParseAction::Reduce(p(3));
        let gotos = ReduceGotoTable {
            rows: vec![vec![None, Some(StateID::from_raw(5))]],
        };

        let packed = PackedTables::pack(&actions, &gotos, StateID::START, p(0)).unwrap();
        assert_eq!(packed.action_rows[0], vec![1, 3, 2, -4, 3, -4, -1, 0]);
        assert_eq!(packed.reduce_rows[0], vec![1, 5, -1, -1]);

        actions.compact();
        let packed = PackedTables::pack(&actions, &gotos, StateID::START, p(0)).unwrap();
        assert_eq!(packed.action_rows[0], vec![1, 3, -1, -4]);
        assert_eq!(
            packed.action(StateID::START, TerminalID::EOF).unwrap(),
            PackedAction::Reduce(p(3))
        );
    }

    #[test]
    fn encode_then_decode() {
        let g = expr_grammar();
        let (actions, gotos) = tables(&g, true);
        let packed = PackedTables::pack(&actions, &gotos, StateID::START, ProductionID::START).unwrap();
        let words = packed.encode();
        assert_eq!(words[0] as usize, actions.rows.len());
        assert_eq!(PackedTables::decode(&words).unwrap(), packed);
    }

    #[test]
    fn decode_rejects_malformed_input() {
        let malformed = |words: &[i32]| {
            matches!(
                PackedTables::decode(words),
                Err(InternalError::MalformedPackedTable { .. })
            )
        };
        assert!(malformed(&[]));
        assert!(malformed(&[1, 1, 0, 0, 2, -1]));
        assert!(malformed(&[1, 1, 0, 0, 3, -1, 0, 0, 2, -1, -1]));
        assert!(malformed(&[1, 1, 0, 0, 2, 4, 0, 2, -1, -1]));
        assert!(malformed(&[1, 1, 0, 0, 2, -1, 0, 2, -1, -1, 7]));
        assert!(malformed(&[1, 1, 3, 0, 2, -1, 0, 2, -1, -1]));
        assert!(!malformed(&[1, 1, 0, 0, 2, -1, 0, 2, -1, -1]));
    }

    #[test]
    fn unreduced_from_packed_rows() {
        let g = Grammar::define(|def| {
            let a = def.terminal("A", None)?;
            let b = def.terminal("B", None)?;
            let s = def.nonterminal("s")?;
            let dead = def.nonterminal("dead")?;
            def.rule(s, [T(a)], None)?;
            def.rule(dead, [T(b)], None)?;
            Ok(())
        })
        .unwrap();
        for compact in [false, true] {
            let (actions, gotos) = tables(&g, compact);
            let packed =
                PackedTables::pack(&actions, &gotos, StateID::START, ProductionID::START).unwrap();
            assert_eq!(
                packed.unreduced_productions(g.num_productions()).unwrap(),
                crate::table::check_reductions(&g, &actions)
            );
            assert_eq!(
                packed.unreduced_productions(g.num_productions()).unwrap(),
                vec![ProductionID::from_raw(2)]
            );
        }
    }
}
