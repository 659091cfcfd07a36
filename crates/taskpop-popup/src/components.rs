mod priority_badge;
mod task_form;
mod task_list;
mod task_row;

pub use priority_badge::PriorityBadge;
pub use task_form::TaskForm;
pub use task_list::TaskList;
pub use task_row::TaskRowView;
