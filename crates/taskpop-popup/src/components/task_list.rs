use taskpop_core::view::TaskRow;
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

use super::TaskRowView;

#[derive(Properties, PartialEq)]
pub struct TaskListProps {
  pub rows:      Vec<TaskRow>,
  pub on_toggle: Callback<(u64, bool)>,
  pub on_delete: Callback<u64>
}

#[function_component(TaskList)]
pub fn task_list(
  props: &TaskListProps
) -> Html {
  html! {
      <div id="task-list" class="task-list">
          {
              for props.rows.iter().cloned().map(|row| html! {
                  <TaskRowView
                      row={row}
                      on_toggle={props.on_toggle.clone()}
                      on_delete={props.on_delete.clone()}
                  />
              })
          }
      </div>
  }
}
