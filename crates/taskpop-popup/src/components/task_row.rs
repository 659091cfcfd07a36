use taskpop_core::view::{
  ATTACHMENT_CAPTION,
  DELETE_CAPTION,
  TaskRow
};
use yew::{
  Callback,
  Html,
  Properties,
  TargetCast,
  classes,
  function_component,
  html
};

use super::PriorityBadge;

#[derive(Properties, PartialEq)]
pub struct TaskRowViewProps {
  pub row:       TaskRow,
  pub on_toggle: Callback<(u64, bool)>,
  pub on_delete: Callback<u64>
}

#[function_component(TaskRowView)]
pub fn task_row_view(
  props: &TaskRowViewProps
) -> Html {
  let id = props.row.id;

  let on_change = {
    let on_toggle =
      props.on_toggle.clone();
    Callback::from(
      move |e: web_sys::Event| {
        let input: web_sys::HtmlInputElement =
          e.target_unchecked_into();
        on_toggle
          .emit((id, input.checked()));
      }
    )
  };

  let on_delete = {
    let on_delete =
      props.on_delete.clone();
    Callback::from(
      move |_: yew::MouseEvent| {
        on_delete.emit(id)
      }
    )
  };

  html! {
      <div class={classes!("task-item", props.row.completed.then_some("completed"))} data-id={id.to_string()}>
          <input type="checkbox" checked={props.row.completed} onchange={on_change} />
          <div class="task-details">
              <span>{ &props.row.text }</span>
              <p>{ &props.row.description }</p>
              <a class="attachment-link" href={props.row.attachment_href.clone()} target="_blank">
                  { ATTACHMENT_CAPTION }
              </a>
              <span class="due-date">{ &props.row.due_label }</span>
              <PriorityBadge
                  label={props.row.priority_label}
                  style_class={props.row.priority_class.clone()}
              />
              <button class="delete-button" onclick={on_delete}>{ DELETE_CAPTION }</button>
          </div>
      </div>
  }
}
