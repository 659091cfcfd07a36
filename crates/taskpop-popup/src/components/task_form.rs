use taskpop_core::config::DEFAULT_CATEGORIES;
use taskpop_core::task::Priority;
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

/// The entry form. Its priority and
/// category selectors double as the
/// list filter.
#[derive(Properties, PartialEq)]
pub struct TaskFormProps {
  pub text:                 String,
  pub description:          String,
  pub priority:             String,
  pub category:             String,
  pub attachment:           String,
  pub due_date:             String,
  pub on_text_input:
    Callback<web_sys::InputEvent>,
  pub on_description_input:
    Callback<web_sys::InputEvent>,
  pub on_attachment_input:
    Callback<web_sys::InputEvent>,
  pub on_due_date_input:
    Callback<web_sys::InputEvent>,
  pub on_priority_change:
    Callback<web_sys::Event>,
  pub on_category_change:
    Callback<web_sys::Event>,
  pub on_submit:
    Callback<web_sys::SubmitEvent>
}

#[function_component(TaskForm)]
pub fn task_form(
  props: &TaskFormProps
) -> Html {
  html! {
      <form id="task-form" class="task-form" onsubmit={props.on_submit.clone()}>
          <input
              id="task-input"
              placeholder="Add a new task"
              value={props.text.clone()}
              oninput={props.on_text_input.clone()}
          />
          <textarea
              id="description-input"
              placeholder="Description"
              value={props.description.clone()}
              oninput={props.on_description_input.clone()}
          />
          <div class="field-row">
              <select
                  id="priority-select"
                  onchange={props.on_priority_change.clone()}
              >
                  <option value="" selected={props.priority.is_empty()}>{ "Priority" }</option>
                  {
                      for Priority::ALL.into_iter().map(|priority| html! {
                          <option
                              value={priority.code()}
                              selected={props.priority == priority.code()}
                          >
                              { priority.name() }
                          </option>
                      })
                  }
              </select>
              <select
                  id="category-select"
                  onchange={props.on_category_change.clone()}
              >
                  <option value="" selected={props.category.is_empty()}>{ "Category" }</option>
                  {
                      for DEFAULT_CATEGORIES.into_iter().map(|category| html! {
                          <option
                              value={category}
                              selected={props.category == category}
                          >
                              { category }
                          </option>
                      })
                  }
              </select>
          </div>
          <input
              id="attachment-input"
              placeholder="Attachment link"
              value={props.attachment.clone()}
              oninput={props.on_attachment_input.clone()}
          />
          <input
              id="due-date-input"
              type="date"
              value={props.due_date.clone()}
              oninput={props.on_due_date_input.clone()}
          />
          <button type="submit" class="btn">{ "Add Task" }</button>
      </form>
  }
}
