//! Well-known tag names

pub const TYPE_PLAYER: &str = "Character.Type.Player";
pub const TYPE_ENEMY: &str = "Character.Type.Enemy";

pub const STATE_ALIVE: &str = "Character.State.Alive";
pub const STATE_DEAD: &str = "Character.State.Dead";
pub const STATE_BOUND: &str = "Character.State.Bound";

pub const MOVEMENT_JOGGING: &str = "Character.Movement.Jogging";
pub const MOVEMENT_SPRINTING: &str = "Character.Movement.Sprinting";
pub const MOVEMENT_CAN_MOVE: &str = "Character.Movement.Status.CanMove";

pub const ABILITY_JUMP: &str = "Character.Ability.Jump";
pub const ABILITY_SPRINT: &str = "Character.Ability.Sprint";
pub const ABILITY_PRIMARY_ATTACK: &str = "Character.Ability.Attack.Primary";
pub const ABILITY_SECONDARY_ATTACK: &str = "Character.Ability.Attack.Secondary";

pub const COMBAT: &str = "Combat";
pub const STAMINA_REDUCTION: &str = "Combat.Stamina.Reduction";
pub const DAMAGE_MELEE_STAFF: &str = "Combat.Damage.Event.Melee.Staff";

pub const NOTIFY_DAMAGE_BEGIN: &str = "Combat.Notify.Damage.Begin";
pub const NOTIFY_DAMAGE_END: &str = "Combat.Notify.Damage.End";
pub const NOTIFY_COMBO_BEGIN: &str = "Combat.Notify.Combo.Begin";
pub const NOTIFY_COMBO_END: &str = "Combat.Notify.Combo.End";
pub const STATE_ATTACKING: &str = "Combat.State.Attacking";

pub const COOLDOWN_SECONDARY_ATTACK: &str = "Cooldown.Attack.Secondary";

/// Owned while any attack ability is active
pub const STATE_IN_ATTACK: &str = "Character.State.InAttack";

pub const EXPERIENCE_GAIN: &str = "Character.Progression.Experience";
