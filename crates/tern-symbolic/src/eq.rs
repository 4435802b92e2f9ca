//! Lazy equality cache.
//!
//! Cell equality is derived structurally: direct solver equality for
//! scalars, subset-both-ways over membership flags for sets, domain plus
//! array equality for functions, element-wise recursion for tuples,
//! sequences, and records, tag then payload for variants. Each derived
//! equality is asserted once as `eq_a_b <=> derivation` and memoized
//! under the normalized (unordered) cell pair, so the many rules that
//! need "is cell X equal to cell Y" never re-derive it.

use tern_ir::CellId;
use tern_types::Type;
use tracing::trace;
use z3::ast::Bool;

use crate::rewriter::Rewriter;
use crate::sorts;
use crate::state::SymbState;
use crate::{EncodeError, EncodeResult};

/// Normalize an unordered pair into a cache key.
fn key(a: CellId, b: CellId) -> (CellId, CellId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl Rewriter<'_> {
    /// Ensure an equality term exists for every given pair, deriving and
    /// asserting each uncached one exactly once.
    pub fn cache_eq_constraints(
        &mut self,
        mut state: SymbState,
        pairs: &[(CellId, CellId)],
    ) -> EncodeResult<SymbState> {
        for &(a, b) in pairs {
            let k = key(a, b);
            if self.eq_cache.contains_key(&k) {
                continue;
            }
            if a == b {
                self.eq_cache.insert(k, Bool::from_bool(true));
                continue;
            }
            // Children precede parents in an append-only arena, so the
            // recursion below always bottoms out.
            let (next, derived) = self.derive_eq(state, a, b)?;
            state = next;
            let flag = Bool::new_const(format!("eq_{}_{}", k.0.index(), k.1.index()));
            self.assert(&flag.iff(&derived));
            trace!(a = %a, b = %b, "cached equality");
            self.eq_cache.insert(k, flag);
        }
        Ok(state)
    }

    /// The cached equality term for an unordered pair. Requesting a pair
    /// that was never passed through `cache_eq_constraints` is a
    /// contract violation.
    pub fn eq_term(&self, a: CellId, b: CellId) -> EncodeResult<Bool> {
        self.eq_cache.get(&key(a, b)).cloned().ok_or_else(|| {
            EncodeError::Contract(format!("equality of {} and {} never derived", a, b))
        })
    }

    fn derive_eq(
        &mut self,
        state: SymbState,
        a: CellId,
        b: CellId,
    ) -> EncodeResult<(SymbState, Bool)> {
        let ty_a = state.arena.cell_type(a).clone();
        let ty_b = state.arena.cell_type(b).clone();
        match (&ty_a, &ty_b) {
            (Type::Bool, Type::Bool) => {
                let t = self.bool_term(a)?.eq(&self.bool_term(b)?);
                Ok((state, t))
            }
            (Type::Int, Type::Int)
            | (Type::Str, Type::Str)
            | (Type::Const(_), Type::Const(_)) => {
                let t = self.int_term(a)?.eq(&self.int_term(b)?);
                Ok((state, t))
            }
            (Type::Set(_), Type::Set(_)) => self.derive_set_eq(state, a, b),
            (Type::Fun(_, _), Type::Fun(_, _)) => self.derive_fun_eq(state, a, b),
            (Type::Tuple(_), Type::Tuple(_)) | (Type::Record(_), Type::Record(_)) => {
                self.derive_pointwise_eq(state, a, b, true)
            }
            (Type::Seq(_), Type::Seq(_)) => self.derive_pointwise_eq(state, a, b, false),
            (Type::Variant(_), Type::Variant(_)) => self.derive_variant_eq(state, a, b),
            _ => Err(EncodeError::Contract(format!(
                "equality between {} of type {} and {} of type {}",
                a, ty_a, b, ty_b
            ))),
        }
    }

    /// Set equality: subset in both directions. An element of one side
    /// that is present must equal some present element of the other.
    fn derive_set_eq(
        &mut self,
        mut state: SymbState,
        a: CellId,
        b: CellId,
    ) -> EncodeResult<(SymbState, Bool)> {
        let elems_a = state.arena.has(a);
        let elems_b = state.arena.has(b);
        let cross: Vec<(CellId, CellId)> = elems_a
            .iter()
            .flat_map(|&x| elems_b.iter().map(move |&y| (x, y)))
            .collect();
        state = self.cache_eq_constraints(state, &cross)?;

        let mut conjuncts = Vec::new();
        for &x in &elems_a {
            let hit = self.hit_term(x, &elems_b, b)?;
            conjuncts.push(self.in_flag(x, a).implies(&hit));
        }
        for &y in &elems_b {
            let hit = self.hit_term(y, &elems_a, a)?;
            conjuncts.push(self.in_flag(y, b).implies(&hit));
        }
        // Two sets with no elements at all are equal: empty conjunction.
        Ok((state, sorts::and_all(&conjuncts)))
    }

    /// OR over "equals that element AND that element is present".
    /// Assumes the relevant pairs are already cached.
    fn hit_term(&mut self, x: CellId, others: &[CellId], set: CellId) -> EncodeResult<Bool> {
        let mut disjuncts = Vec::with_capacity(others.len());
        for &y in others {
            let eq = self.eq_term(x, y)?;
            let present = self.in_flag(y, set);
            disjuncts.push(Bool::and(&[eq, present]));
        }
        Ok(sorts::or_any(&disjuncts))
    }

    /// Function equality: equal domains and equal arrays. The constant
    /// array representation makes the array equality extensional without
    /// extensionality axioms.
    fn derive_fun_eq(
        &mut self,
        state: SymbState,
        a: CellId,
        b: CellId,
    ) -> EncodeResult<(SymbState, Bool)> {
        let dom_a = state.arena.dom(a)?;
        let dom_b = state.arena.dom(b)?;
        let state = self.cache_eq_constraints(state, &[(dom_a, dom_b)])?;
        let doms_eq = self.eq_term(dom_a, dom_b)?;
        let arrays_eq = self.array_term(a)?.eq(&self.array_term(b)?);
        Ok((state, Bool::and(&[doms_eq, arrays_eq])))
    }

    /// Element-wise equality for tuples, records, and sequences. Tuples
    /// and records of the same type always have matching arity; a length
    /// mismatch there is a contract violation. Sequence literals of
    /// different lengths are simply unequal.
    fn derive_pointwise_eq(
        &mut self,
        mut state: SymbState,
        a: CellId,
        b: CellId,
        same_arity: bool,
    ) -> EncodeResult<(SymbState, Bool)> {
        let elems_a = state.arena.has(a);
        let elems_b = state.arena.has(b);
        if elems_a.len() != elems_b.len() {
            if same_arity {
                return Err(EncodeError::Contract(format!(
                    "arity mismatch between {} and {} of equal type",
                    a, b
                )));
            }
            return Ok((state, Bool::from_bool(false)));
        }
        let pairs: Vec<(CellId, CellId)> =
            elems_a.iter().copied().zip(elems_b.iter().copied()).collect();
        state = self.cache_eq_constraints(state, &pairs)?;
        let mut conjuncts = Vec::with_capacity(pairs.len());
        for (x, y) in pairs {
            conjuncts.push(self.eq_term(x, y)?);
        }
        Ok((state, sorts::and_all(&conjuncts)))
    }

    /// Variant equality: discriminant tags equal and payloads equal.
    /// Payloads of different types belong to different alternatives, so
    /// the cells cannot be equal.
    fn derive_variant_eq(
        &mut self,
        mut state: SymbState,
        a: CellId,
        b: CellId,
    ) -> EncodeResult<(SymbState, Bool)> {
        let parts_a = state.arena.has(a);
        let parts_b = state.arena.has(b);
        let (&[tag_a, val_a], &[tag_b, val_b]) = (&parts_a[..], &parts_b[..]) else {
            return Err(EncodeError::Contract(format!(
                "variant cells {} and {} without tag/payload structure",
                a, b
            )));
        };
        if state.arena.cell_type(val_a) != state.arena.cell_type(val_b) {
            return Ok((state, Bool::from_bool(false)));
        }
        state = self.cache_eq_constraints(state, &[(tag_a, tag_b), (val_a, val_b)])?;
        let t = Bool::and(&[self.eq_term(tag_a, tag_b)?, self.eq_term(val_a, val_b)?]);
        Ok((state, t))
    }
}
