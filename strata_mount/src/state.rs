// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mounted-state bookkeeping and diffing.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use kurbo::Rect;
use strata_core::key::GlobalKey;

use crate::output::MountableOutput;
use crate::plan::{MountInstruction, MountPlan};

/// The outputs currently mounted on the host, in host child order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MountState {
    mounted: Vec<(GlobalKey, Rect)>,
}

impl MountState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of mounted outputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mounted.len()
    }

    /// Returns `true` if nothing is mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mounted.is_empty()
    }

    /// Returns `true` if `key` is mounted.
    #[must_use]
    pub fn contains(&self, key: &GlobalKey) -> bool {
        self.position(key).is_some()
    }

    /// Returns the mounted keys in host order.
    pub fn keys(&self) -> impl Iterator<Item = &GlobalKey> + '_ {
        self.mounted.iter().map(|(key, _)| key)
    }

    /// Returns the bounds `key` was mounted with.
    #[must_use]
    pub fn bounds(&self, key: &GlobalKey) -> Option<Rect> {
        self.position(key).map(|i| self.mounted[i].1)
    }

    /// Diffs the mounted state against `desired`, which must be in
    /// traversal order.
    ///
    /// Detaches come first, in reverse mounted order, so hosts that index
    /// children positionally never see a shifted index. The desired list is
    /// then walked front to back against a simulation of the host's child
    /// list: a missing key is attached at its position, a key found
    /// elsewhere is moved there, and a key already in place with different
    /// bounds is updated.
    #[must_use]
    pub fn plan(&self, desired: &[MountableOutput]) -> MountPlan {
        let wanted: BTreeSet<&GlobalKey> = desired.iter().map(|o| &o.key).collect();
        let mut plan = MountPlan::new();

        for (key, _) in self.mounted.iter().rev() {
            if !wanted.contains(key) {
                plan.instructions
                    .push(MountInstruction::Detach { key: key.clone() });
            }
        }

        let mut host: Vec<(&GlobalKey, Rect)> = self
            .mounted
            .iter()
            .filter(|(key, _)| wanted.contains(key))
            .map(|(key, bounds)| (key, *bounds))
            .collect();
        for (index, output) in desired.iter().enumerate() {
            match host.iter().position(|(key, _)| *key == &output.key) {
                None => {
                    host.insert(index, (&output.key, output.bounds));
                    plan.instructions.push(MountInstruction::Attach {
                        key: output.key.clone(),
                        index,
                        bounds: output.bounds,
                    });
                }
                Some(at) if at != index => {
                    host.remove(at);
                    host.insert(index, (&output.key, output.bounds));
                    plan.instructions.push(MountInstruction::Move {
                        key: output.key.clone(),
                        index,
                        bounds: output.bounds,
                    });
                }
                Some(at) => {
                    if host[at].1 != output.bounds {
                        host[at].1 = output.bounds;
                        plan.instructions.push(MountInstruction::UpdateBounds {
                            key: output.key.clone(),
                            bounds: output.bounds,
                        });
                    }
                }
            }
        }
        plan
    }

    /// Records one instruction the host has carried out.
    ///
    /// # Panics
    ///
    /// Panics if the instruction does not fit the recorded state (attaching
    /// a mounted key, touching an unmounted one, or an index past the end).
    pub fn apply(&mut self, instruction: &MountInstruction) {
        match instruction {
            MountInstruction::Attach { key, index, bounds } => {
                assert!(!self.contains(key), "{key} is already mounted");
                assert!(
                    *index <= self.mounted.len(),
                    "attach index {index} out of range (len {})",
                    self.mounted.len()
                );
                self.mounted.insert(*index, (key.clone(), *bounds));
            }
            MountInstruction::Detach { key } => {
                let at = self.expect_mounted(key);
                self.mounted.remove(at);
            }
            MountInstruction::Move { key, index, bounds } => {
                let at = self.expect_mounted(key);
                let (key, _) = self.mounted.remove(at);
                assert!(
                    *index <= self.mounted.len(),
                    "move index {index} out of range (len {})",
                    self.mounted.len()
                );
                self.mounted.insert(*index, (key, *bounds));
            }
            MountInstruction::UpdateBounds { key, bounds } => {
                let at = self.expect_mounted(key);
                self.mounted[at].1 = *bounds;
            }
        }
    }

    /// Forgets everything, e.g. after the host dropped its content.
    pub fn clear(&mut self) {
        self.mounted.clear();
    }

    fn position(&self, key: &GlobalKey) -> Option<usize> {
        self.mounted.iter().position(|(k, _)| k == key)
    }

    fn expect_mounted(&self, key: &GlobalKey) -> usize {
        let Some(at) = self.position(key) else {
            panic!("{key} is not mounted");
        };
        at
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use strata_core::node::NodeId;

    use super::*;

    fn key(s: &str) -> GlobalKey {
        GlobalKey::root(s)
    }

    fn out(name: &str, y: f64) -> MountableOutput {
        MountableOutput {
            key: key(name),
            node: NodeId::ROOT,
            bounds: Rect::new(0.0, y, 10.0, y + 10.0),
        }
    }

    fn mounted(outputs: &[MountableOutput]) -> MountState {
        let mut state = MountState::new();
        for instruction in &state.plan(outputs).instructions {
            state.apply(instruction);
        }
        state
    }

    fn keys(state: &MountState) -> Vec<&str> {
        state.keys().map(GlobalKey::as_str).collect()
    }

    #[test]
    fn first_plan_attaches_in_order() {
        let desired = [out("a", 0.0), out("b", 10.0)];
        let plan = MountState::new().plan(&desired);
        assert_eq!(
            plan.instructions,
            vec![
                MountInstruction::Attach {
                    key: key("a"),
                    index: 0,
                    bounds: desired[0].bounds,
                },
                MountInstruction::Attach {
                    key: key("b"),
                    index: 1,
                    bounds: desired[1].bounds,
                },
            ]
        );
    }

    #[test]
    fn detaches_come_first_in_reverse_order() {
        let state = mounted(&[out("a", 0.0), out("b", 10.0), out("c", 20.0)]);
        let plan = state.plan(&[out("b", 10.0), out("d", 30.0)]);
        assert_eq!(
            plan.instructions,
            vec![
                MountInstruction::Detach { key: key("c") },
                MountInstruction::Detach { key: key("a") },
                MountInstruction::Attach {
                    key: key("d"),
                    index: 1,
                    bounds: out("d", 30.0).bounds,
                },
            ]
        );
    }

    #[test]
    fn unchanged_outputs_produce_empty_plan() {
        let desired = [out("a", 0.0), out("b", 10.0)];
        assert!(mounted(&desired).plan(&desired).is_empty(), "nothing changed");
    }

    #[test]
    fn reorder_emits_move() {
        let state = mounted(&[out("a", 0.0), out("b", 10.0), out("c", 20.0)]);
        let desired = [out("c", 20.0), out("a", 0.0), out("b", 10.0)];
        let plan = state.plan(&desired);
        assert_eq!(
            plan.instructions,
            vec![MountInstruction::Move {
                key: key("c"),
                index: 0,
                bounds: desired[0].bounds,
            }]
        );
    }

    #[test]
    fn bounds_change_in_place_emits_update() {
        let state = mounted(&[out("a", 0.0), out("b", 10.0)]);
        let plan = state.plan(&[out("a", 0.0), out("b", 15.0)]);
        assert_eq!(
            plan.instructions,
            vec![MountInstruction::UpdateBounds {
                key: key("b"),
                bounds: out("b", 15.0).bounds,
            }]
        );
        assert_eq!(plan.summary(7).updated, 1);
    }

    #[test]
    fn applying_a_plan_reaches_the_desired_state() {
        let mut state = mounted(&[out("a", 0.0), out("b", 10.0), out("c", 20.0), out("d", 30.0)]);
        let desired = [out("d", 0.0), out("x", 5.0), out("b", 10.0), out("a", 20.0)];
        for instruction in &state.plan(&desired).instructions {
            state.apply(instruction);
        }
        assert_eq!(keys(&state), ["d", "x", "b", "a"]);
        assert_eq!(state.bounds(&key("a")), Some(desired[3].bounds));
        assert!(state.plan(&desired).is_empty(), "second plan is a no-op");
    }

    #[test]
    #[should_panic(expected = "is not mounted")]
    fn detaching_unmounted_key_panics() {
        MountState::new().apply(&MountInstruction::Detach { key: key("a") });
    }
}
