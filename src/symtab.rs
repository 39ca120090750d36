//! Symbol table: expression definitions, forward (by-name) references and
//! deferred value writes.
//!
//! A symbol's value may depend on other symbols not yet defined when it is
//! referenced (a label used before its `:` line, an `equ` built from a
//! later constant). Each reference that cannot be resolved immediately is
//! recorded as a [`Definition`] node; resolution walks the resulting graph
//! once every symbol has a chance to be defined, converting each node to a
//! plain value in place as it resolves (so a diamond of shared references
//! is only ever computed once).

use std::collections::HashMap;

use crate::fault::{Faults, Position, Severity};
use crate::section::{SectionId, SectionStore};
use crate::valwr::{self, Shape};

/// Hop limit during recursive resolution, guarding against reference
/// cycles (`a equ b`, `b equ a`).
pub const MAX_HOPS: u32 = 16;

/// Identifies a definition node in the table's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DefId(u32);

/// The operation combining a definition's two sources into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Mov,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Xor,
    Shr,
    Shl,
}

/// One operand of a definition: an immediate value, a reference to another
/// definition by id, or a forward reference to a symbol name that may not
/// be bound yet.
#[derive(Debug, Clone)]
pub enum Source {
    Value(u32),
    ById(DefId),
    ByName(String),
}

struct Definition {
    op: Op,
    src0: Source,
    src1: Source,
    position: Position,
}

struct Use {
    section: SectionId,
    offset: usize,
    shape: Shape,
    def: DefId,
    position: Position,
}

enum ResolveError {
    /// A fault was already reported for this failure.
    Fail,
    /// No fault reported yet; carries the unbound name so the caller can
    /// attribute the "Undefined symbol" message to the right position.
    Undefined(String),
}

/// The symbol table for one compile: every expression node ever created,
/// every deferred section write they feed, and the name bindings connecting
/// labels and `equ` symbols to the definitions they name.
#[derive(Default)]
pub struct SymbolTable {
    defs: Vec<Definition>,
    uses: Vec<Use>,
    bound: HashMap<String, DefId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            defs: Vec::new(),
            uses: Vec::new(),
            bound: HashMap::new(),
        }
    }

    /// Adds a new definition node and returns its id. Does not bind it to
    /// any name; use [`SymbolTable::bind`] to make it the value of a label
    /// or `equ` symbol.
    pub fn add_definition(&mut self, op: Op, src0: Source, src1: Source, position: Position) -> DefId {
        self.defs.push(Definition { op, src0, src1, position });
        DefId((self.defs.len() - 1) as u32)
    }

    /// Adds a plain immediate value as a definition node.
    pub fn add_value(&mut self, value: u32, position: Position) -> DefId {
        self.add_definition(Op::Mov, Source::Value(value), Source::Value(0), position)
    }

    /// Returns the definition currently bound to `name`, or creates a
    /// "dangling" node that resolves by looking the name up again once
    /// resolution runs (used for references that appear before the
    /// label or `equ` defining them).
    pub fn get_or_create_by_name(&mut self, name: &str, position: Position) -> DefId {
        if let Some(&id) = self.bound.get(name) {
            return id;
        }
        self.add_definition(
            Op::Mov,
            Source::ByName(name.to_string()),
            Source::Value(0),
            position,
        )
    }

    /// Binds `id` as the definition of `name`. Fails (without altering the
    /// table) if `name` is already bound to a different definition.
    pub fn bind(&mut self, name: &str, id: DefId, position: &Position, faults: &mut Faults) -> Result<(), ()> {
        if let Some(&existing) = self.bound.get(name) {
            faults.report(
                Severity::Fail,
                format!("Redefinition of symbol {}", name),
                position.clone(),
            );
            faults.report(
                Severity::Note,
                "Location of previous definition",
                self.defs[existing.0 as usize].position.clone(),
            );
            return Err(());
        }
        self.bound.insert(name.to_string(), id);
        Ok(())
    }

    /// Records a deferred write: once `def` resolves, its value is encoded
    /// into `section[offset]` per `shape`.
    pub fn add_use(
        &mut self,
        def: DefId,
        section: SectionId,
        offset: usize,
        shape: Shape,
        position: Position,
    ) {
        self.uses.push(Use { section, offset, shape, def, position });
    }

    fn resolve_source(&mut self, source: &Source, hops: u32, faults: &mut Faults) -> Result<u32, ResolveError> {
        match source {
            Source::Value(v) => Ok(*v),
            Source::ById(id) => self.recres(*id, hops + 1, faults),
            Source::ByName(name) => {
                let target = self
                    .bound
                    .get(name)
                    .copied()
                    .ok_or_else(|| ResolveError::Undefined(name.clone()))?;
                self.recres(target, hops + 1, faults)
            }
        }
    }

    /// Resolves `id`, collapsing it (and anything it transitively depends
    /// on) into a plain value in place. Returns the same error the
    /// original reported: a fault already printed (`Fail`), or an unbound
    /// name the caller should attribute and report itself (`Undefined`).
    fn recres(&mut self, id: DefId, hops: u32, faults: &mut Faults) -> Result<u32, ResolveError> {
        if let Op::Mov = self.defs[id.0 as usize].op {
            if let Source::Value(v) = self.defs[id.0 as usize].src0 {
                return Ok(v);
            }
        }

        if hops >= MAX_HOPS {
            let position = self.defs[id.0 as usize].position.clone();
            faults.report(
                Severity::Fail,
                format!("Hop count ({}) during resolution exceed", MAX_HOPS),
                position,
            );
            return Err(ResolveError::Fail);
        }

        let op = self.defs[id.0 as usize].op;
        let src0 = self.defs[id.0 as usize].src0.clone();
        let src1 = self.defs[id.0 as usize].src1.clone();
        let position = self.defs[id.0 as usize].position.clone();

        let v0 = self.resolve_source(&src0, hops, faults)?;
        let v1 = self.resolve_source(&src1, hops, faults)?;

        let r = match op {
            Op::Mov => v0,
            Op::Add => v0.wrapping_add(v1),
            Op::Sub => v0.wrapping_sub(v1),
            Op::Mul => v0.wrapping_mul(v1),
            Op::Div => {
                if v1 == 0 {
                    faults.report(Severity::Fail, "Division by zero", position);
                    return Err(ResolveError::Fail);
                }
                v0 / v1
            }
            Op::Mod => {
                if v1 == 0 {
                    faults.report(Severity::Fail, "Division by zero", position);
                    return Err(ResolveError::Fail);
                }
                v0 % v1
            }
            Op::And => v0 & v1,
            Op::Or => v0 | v1,
            Op::Xor => v0 ^ v1,
            Op::Shr => v0 >> (v1 & 31),
            Op::Shl => v0 << (v1 & 31),
        };

        let def = &mut self.defs[id.0 as usize];
        def.op = Op::Mov;
        def.src0 = Source::Value(r);
        Ok(r)
    }

    /// Attempts to resolve `id` without requiring the whole table to be
    /// resolvable yet. Used to pre-resolve symbols opportunistically (e.g.
    /// to pick a shorter instruction encoding when a forward reference
    /// happens to already be known).
    pub fn try_resolve(&mut self, id: DefId, faults: &mut Faults) -> Option<u32> {
        self.recres(id, 0, faults).ok()
    }

    /// Resolves every definition and flushes every deferred write into
    /// `sections`. Returns `Err(())` on the first unresolvable symbol or
    /// out-of-range value (a fault has already been reported).
    pub fn resolve_all(&mut self, sections: &mut SectionStore, faults: &mut Faults) -> Result<(), ()> {
        for i in 0..self.defs.len() {
            let id = DefId(i as u32);
            match self.recres(id, 0, faults) {
                Ok(_) => {}
                Err(ResolveError::Fail) => return Err(()),
                Err(ResolveError::Undefined(name)) => {
                    let position = self.defs[id.0 as usize].position.clone();
                    faults.report(Severity::Fail, format!("Undefined symbol: {}", name), position);
                    return Err(());
                }
            }
        }

        for i in 0..self.uses.len() {
            let (section, offset, shape, def, position) = {
                let u = &self.uses[i];
                (u.section, u.offset, u.shape, u.def, u.position.clone())
            };
            let value = match self.defs[def.0 as usize].src0 {
                Source::Value(v) => v,
                _ => unreachable!("definition left unresolved after a full resolution pass"),
            };
            valwr::write(sections, section, value, offset, shape, &position, faults).map_err(|_| ())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_reference_resolves_after_binding() {
        let mut tab = SymbolTable::new();
        let mut faults = Faults::new();
        let reference = tab.get_or_create_by_name("later", Position::none());
        let literal = tab.add_value(42, Position::none());
        tab.bind("later", literal, &Position::none(), &mut faults).unwrap();
        assert_eq!(tab.try_resolve(reference, &mut faults), Some(42));
        assert!(!faults.failed());
    }

    #[test]
    fn redefinition_fails() {
        let mut tab = SymbolTable::new();
        let mut faults = Faults::new();
        let a = tab.add_value(1, Position::none());
        let b = tab.add_value(2, Position::none());
        tab.bind("x", a, &Position::none(), &mut faults).unwrap();
        assert!(tab.bind("x", b, &Position::none(), &mut faults).is_err());
        assert!(faults.failed());
    }

    #[test]
    fn arithmetic_combines_two_sources() {
        let mut tab = SymbolTable::new();
        let mut faults = Faults::new();
        let a = tab.add_value(10, Position::none());
        let b = tab.add_value(3, Position::none());
        let sum = tab.add_definition(Op::Add, Source::ById(a), Source::ById(b), Position::none());
        assert_eq!(tab.try_resolve(sum, &mut faults), Some(13));
    }

    #[test]
    fn division_by_zero_fails() {
        let mut tab = SymbolTable::new();
        let mut faults = Faults::new();
        let a = tab.add_value(10, Position::none());
        let z = tab.add_value(0, Position::none());
        let div = tab.add_definition(Op::Div, Source::ById(a), Source::ById(z), Position::none());
        assert_eq!(tab.try_resolve(div, &mut faults), None);
        assert!(faults.failed());
    }

    #[test]
    fn self_reference_cycle_is_caught() {
        let mut tab = SymbolTable::new();
        let mut faults = Faults::new();
        let reference = tab.get_or_create_by_name("loop_sym", Position::none());
        tab.bind("loop_sym", reference, &Position::none(), &mut faults).unwrap();
        assert_eq!(tab.try_resolve(reference, &mut faults), None);
        assert!(faults.failed());
    }

    #[test]
    fn undefined_symbol_reported_during_resolve_all() {
        let mut tab = SymbolTable::new();
        let mut faults = Faults::new();
        let mut sections = SectionStore::new();
        let _reference = tab.get_or_create_by_name("missing", Position::none());
        assert!(tab.resolve_all(&mut sections, &mut faults).is_err());
        assert!(faults.failed());
    }

    #[test]
    fn resolve_all_flushes_pending_writes() {
        let mut tab = SymbolTable::new();
        let mut faults = Faults::new();
        let mut sections = SectionStore::new();
        sections.select(SectionId::Code);
        sections.push_word(0).unwrap();
        let value = tab.add_value(0x1234, Position::none());
        tab.add_use(value, SectionId::Code, 0, Shape::C16, Position::none());
        tab.resolve_all(&mut sections, &mut faults).unwrap();
        assert_eq!(sections.data(SectionId::Code)[0], 0x1234);
    }
}
