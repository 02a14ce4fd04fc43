//! UI Components
//!
//! Reusable Leptos components.

mod ai_settings;
mod delete_goal_button;
mod goal_card;
mod goal_list;
mod milestone_row;
mod new_goal_form;
mod save_notice;

pub use ai_settings::AiSettings;
pub use delete_goal_button::DeleteGoalButton;
pub use goal_card::GoalCard;
pub use goal_list::GoalList;
pub use milestone_row::MilestoneRow;
pub use new_goal_form::NewGoalForm;
pub use save_notice::SaveNotice;
