pub mod agent;
pub mod needs;

pub use agent::{ActivitySlot, Agent, AgentState, MealFlags, Meta, PrimaryNeedHandlers};
pub use needs::NeedSet;
