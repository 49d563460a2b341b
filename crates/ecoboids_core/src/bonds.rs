//! Target-lock and mate-bond bookkeeping advanced once per decision.

use crate::config::BehaviorConfig;
use crate::context::BehaviorContext;
use ecoboids_data::{Bonds, Role, Stance, StanceState, TargetLock};

/// Advances an agent's bonds after its stance for this tick is settled.
pub fn update_bonds(
    role: Role,
    stance: &StanceState,
    bonds: &mut Bonds,
    ctx: &BehaviorContext,
    cfg: &BehaviorConfig,
) {
    if role == Role::Predator {
        update_target_lock(stance.current, &mut bonds.target, ctx, cfg);
    } else {
        bonds.target.release();
    }

    if bonds.mate.id.is_some() && stance.current == Stance::Mating {
        bonds.mate.commitment_frames = bonds.mate.commitment_frames.saturating_add(1);
    } else {
        bonds.mate.commitment_frames = 0;
    }
}

/// Locks the closest prey, holds it while visible and lets it fade once lost.
pub fn update_target_lock(
    stance: Stance,
    lock: &mut TargetLock,
    ctx: &BehaviorContext,
    cfg: &BehaviorConfig,
) {
    if stance != Stance::Hunting {
        lock.release();
        return;
    }

    match lock.id {
        Some(_) if ctx.locked_target_distance.is_some() => {
            lock.strength = 1.0;
            lock.frames = lock.frames.saturating_add(1);
        }
        Some(_) => {
            lock.strength *= cfg.lock_decay;
            if lock.strength < cfg.lock_release {
                lock.release();
            }
        }
        None => {
            if let Some(id) = ctx.closest_prey_id {
                *lock = TargetLock {
                    id: Some(id),
                    strength: 1.0,
                    frames: 0,
                };
            }
        }
    }
}
