#[path = "../test_utils.rs"]
mod test_utils;

mod element;
mod hoist_static;
mod slot_outlet;
mod text;
mod v_for;
mod v_if;
mod v_memo;
mod v_once;
mod v_slot;
