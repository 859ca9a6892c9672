//! Grammar definitions shared by the integration tests and the benchmarks.

#![allow(dead_code)]

use lalrtab::grammar::{Assoc, GrammarDef, GrammarDefError, RhsPart, SymbolID::*};

pub type DefResult = Result<(), GrammarDefError>;

pub fn g_simple1(g: &mut GrammarDef) -> DefResult {
    let equal = g.terminal("EQUAL", None)?;
    let plus = g.terminal("PLUS", None)?;
    let ident = g.terminal("ID", None)?;
    let num = g.terminal("NUM", None)?;

    let a = g.nonterminal("A")?;
    let e = g.nonterminal("E")?;
    let t = g.nonterminal("T")?;

    g.start_symbol(a)?;

    g.rule(a, [N(e), T(equal), N(e)], None)?;
    g.rule(a, [T(ident)], None)?;
    g.rule(e, [N(e), T(plus), N(t)], None)?;
    g.rule(e, [N(t)], None)?;
    g.rule(t, [T(num)], None)?;
    g.rule(t, [T(ident)], None)?;
    Ok(())
}

pub fn g_simple2(g: &mut GrammarDef) -> DefResult {
    let lparen = g.terminal("LPAREN", None)?;
    let rparen = g.terminal("RPAREN", None)?;
    let plus = g.terminal("PLUS", None)?;
    let minus = g.terminal("MINUS", None)?;
    let star = g.terminal("STAR", None)?;
    let slash = g.terminal("SLASH", None)?;
    let num = g.terminal("NUM", None)?;

    let expr = g.nonterminal("EXPR")?;
    let factor = g.nonterminal("FACTOR")?;
    let term = g.nonterminal("TERM")?;

    g.rule(expr, [N(expr), T(plus), N(factor)], None)?;
    g.rule(expr, [N(expr), T(minus), N(factor)], None)?;
    g.rule(expr, [N(factor)], None)?;
    g.rule(factor, [N(factor), T(star), N(term)], None)?;
    g.rule(factor, [N(factor), T(slash), N(term)], None)?;
    g.rule(factor, [N(term)], None)?;
    g.rule(term, [T(num)], None)?;
    g.rule(term, [T(lparen), N(expr), T(rparen)], None)?;
    Ok(())
}

/// `DEF ::= PARAM_SPEC RETURN_SPEC COMMA`, where `NAME` and `TYPE` are both
/// an `ID`.
pub fn g2(g: &mut GrammarDef) -> DefResult {
    let comma = g.terminal("COMMA", None)?;
    let colon = g.terminal("COLON", None)?;
    let ident = g.terminal("ID", None)?;

    let def = g.nonterminal("DEF")?;
    let param_spec = g.nonterminal("PARAM_SPEC")?;
    let return_spec = g.nonterminal("RETURN_SPEC")?;
    let type_ = g.nonterminal("TYPE")?;
    let name = g.nonterminal("NAME")?;
    let name_list = g.nonterminal("NAME_LIST")?;

    g.rule(def, [N(param_spec), N(return_spec), T(comma)], None)?;
    g.rule(param_spec, [N(type_)], None)?;
    g.rule(param_spec, [N(name_list), T(colon), N(type_)], None)?;
    g.rule(return_spec, [N(type_)], None)?;
    g.rule(return_spec, [N(name), T(colon), N(type_)], None)?;
    g.rule(type_, [T(ident)], None)?;
    g.rule(name, [T(ident)], None)?;
    g.rule(name_list, [N(name)], None)?;
    g.rule(name_list, [N(name), T(comma), N(name_list)], None)?;
    Ok(())
}

/// Ambiguous arithmetic disambiguated by precedence declarations.
pub fn arithmetic_prec(g: &mut GrammarDef) -> DefResult {
    let plus = g.terminal("PLUS", None)?;
    let minus = g.terminal("MINUS", None)?;
    let star = g.terminal("STAR", None)?;
    let slash = g.terminal("SLASH", None)?;
    let caret = g.terminal("CARET", None)?;
    let eq = g.terminal("EQ", None)?;
    let lparen = g.terminal("LPAREN", None)?;
    let rparen = g.terminal("RPAREN", None)?;
    let num = g.terminal("NUM", None)?;

    g.precedence(Assoc::Nonassoc, [eq])?;
    g.precedence(Assoc::Left, [plus, minus])?;
    g.precedence(Assoc::Left, [star, slash])?;
    g.precedence(Assoc::Right, [caret])?;
    let uminus = g.terminal("UMINUS", None)?;
    g.precedence(Assoc::Right, [uminus])?;
    let uminus_prec = lalrtab::grammar::Precedence::new(5, Assoc::Right);

    let e = g.nonterminal("e")?;
    for op in [plus, minus, star, slash, caret, eq] {
        g.rule(e, [N(e), T(op), N(e)], None)?;
    }
    g.rule(e, [T(minus), N(e)], Some(uminus_prec))?;
    g.rule(e, [T(lparen), N(e), T(rparen)], None)?;
    g.rule(e, [T(num)], None)?;
    Ok(())
}

pub fn dangling_else(g: &mut GrammarDef) -> DefResult {
    let if_ = g.terminal("IF", None)?;
    let then = g.terminal("THEN", None)?;
    let else_ = g.terminal("ELSE", None)?;
    let cond = g.terminal("COND", None)?;
    let other = g.terminal("OTHER", None)?;

    let stmt = g.nonterminal("stmt")?;
    g.rule(stmt, [T(if_), T(cond), T(then), N(stmt)], None)?;
    g.rule(
        stmt,
        [T(if_), T(cond), T(then), N(stmt), T(else_), N(stmt)],
        None,
    )?;
    g.rule(stmt, [T(other)], None)?;
    Ok(())
}

/// Statement lists with mid-rule actions and an error production.
pub fn statements(g: &mut GrammarDef) -> DefResult {
    let ident = g.terminal("ID", None)?;
    let assign = g.terminal("ASSIGN", None)?;
    let semi = g.terminal("SEMI", None)?;
    let lbrace = g.terminal("LBRACE", None)?;
    let rbrace = g.terminal("RBRACE", None)?;
    let error = lalrtab::grammar::TerminalID::ERROR;

    let program = g.nonterminal("program")?;
    let stmts = g.nonterminal("stmts")?;
    let stmt = g.nonterminal("stmt")?;
    g.stack_type(stmt, "Stmt")?;

    g.rule(program, [N(stmts)], None)?;
    g.rule(stmts, [], None)?;
    g.rule(stmts, [N(stmts), N(stmt)], None)?;
    g.rule_with_parts(
        stmt,
        [
            RhsPart::labeled(ident, "name"),
            RhsPart::action("declare(name);"),
            T(assign).into(),
            T(ident).into(),
            T(semi).into(),
            RhsPart::action("RESULT = assign(name);"),
        ],
        None,
    )?;
    g.rule_with_parts(
        stmt,
        [
            RhsPart::from(T(lbrace)),
            RhsPart::action("push_scope();"),
            N(stmts).into(),
            T(rbrace).into(),
            RhsPart::action("pop_scope();"),
        ],
        None,
    )?;
    g.rule(stmt, [T(error), T(semi)], None)?;
    Ok(())
}
