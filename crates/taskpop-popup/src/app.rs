mod list_state;
mod status;
mod theme;

use std::rc::Rc;

use chrono::Utc;
use taskpop_core::config::Config;
use taskpop_core::filter::TaskFilter;
use taskpop_core::manager::TaskManager;
use taskpop_core::task::TaskDraft;
use taskpop_core::theme::Theme;
use yew::{
  Callback,
  Html,
  TargetCast,
  function_component,
  html,
  use_effect_with,
  use_memo,
  use_reducer,
  use_state
};

use self::list_state::{
  ListAction,
  ListState
};
use self::status::status_line;
use self::theme::{
  apply_theme,
  current_theme
};
use crate::components::{
  TaskForm,
  TaskList
};
use crate::storage::PopupArea;

type PopupManager =
  TaskManager<PopupArea>;

#[function_component(App)]
pub fn app() -> Html {
  let config =
    use_memo((), |_| Config::default());
  let manager: Rc<PopupManager> = {
    let config = config.clone();
    use_memo((), move |_| {
      TaskManager::new(
        PopupArea::detect(),
        config.storage_key()
      )
    })
  };

  let list =
    use_reducer(ListState::default);
  let status =
    use_state(|| None::<String>);
  let theme = use_state(Theme::default);

  let text = use_state(String::new);
  let description =
    use_state(String::new);
  let priority = use_state(String::new);
  let category = use_state(String::new);
  let attachment =
    use_state(String::new);
  let due_date = use_state(String::new);

  {
    let manager = manager.clone();
    let list = list.dispatcher();
    let status = status.setter();
    let theme = theme.setter();
    let config = config.clone();

    use_effect_with((), move |_| {
      let initial = match config
        .default_theme()
      {
        | Ok(initial) => initial,
        | Err(error) => {
          tracing::warn!(%error, "using light theme");
          Theme::Light
        }
      };
      apply_theme(initial);
      theme.set(initial);

      wasm_bindgen_futures::spawn_local(
        async move {
          let result =
            manager.tasks().await;
          status.set(status_line(
            "Could not load tasks",
            &result
          ));
          match result {
            | Ok(tasks) => {
              tracing::info!(
                count = tasks.len(),
                "loaded tasks"
              );
              list.dispatch(
                ListAction::Show(tasks)
              );
            }
            | Err(error) => {
              tracing::error!(error = %format!("{error:#}"), "initial load failed");
            }
          }
        }
      );

      || ()
    });
  }

  let on_submit = {
    let manager = manager.clone();
    let list = list.dispatcher();
    let status = status.clone();
    let text = text.clone();
    let description =
      description.clone();
    let priority = priority.clone();
    let category = category.clone();
    let attachment = attachment.clone();
    let due_date = due_date.clone();

    Callback::from(
      move |e: web_sys::SubmitEvent| {
        e.prevent_default();

        let draft = TaskDraft {
          text:        (*text).clone(),
          description: (*description)
            .clone(),
          priority:    (*priority).clone(),
          category:    (*category).clone(),
          attachment:  (*attachment)
            .clone(),
          due_date:    (*due_date).clone()
        };
        if draft.text.trim().is_empty() {
          return;
        }

        text.set(String::new());
        description.set(String::new());
        attachment.set(String::new());
        due_date.set(String::new());

        let manager = manager.clone();
        let list = list.clone();
        let status = status.setter();
        wasm_bindgen_futures::spawn_local(
          async move {
            let result = manager
              .create(draft, Utc::now())
              .await;
            status.set(status_line(
              "Could not save task",
              &result
            ));
            match result {
              | Ok(Some(task)) => {
                list.dispatch(
                  ListAction::Append(task)
                );
              }
              | Ok(None) => {}
              | Err(error) => {
                tracing::error!(error = %format!("{error:#}"), "create failed");
              }
            }
          }
        );
      }
    )
  };

  let on_toggle = {
    let manager = manager.clone();
    let list = list.dispatcher();
    let status = status.setter();

    Callback::from(
      move |(id, completed): (u64, bool)| {
        list.dispatch(
          ListAction::SetCompleted(
            id, completed
          )
        );

        let manager = manager.clone();
        let status = status.clone();
        wasm_bindgen_futures::spawn_local(
          async move {
            let result = manager
              .set_completed(id, completed)
              .await;
            if let Err(error) = &result {
              tracing::error!(id, error = %format!("{error:#}"), "toggle failed");
            }
            status.set(status_line(
              "Could not update task",
              &result
            ));
          }
        );
      }
    )
  };

  let on_delete = {
    let manager = manager.clone();
    let list = list.dispatcher();
    let status = status.setter();

    Callback::from(move |id: u64| {
      list.dispatch(ListAction::Remove(id));

      let manager = manager.clone();
      let status = status.clone();
      wasm_bindgen_futures::spawn_local(
        async move {
          let result =
            manager.delete(id).await;
          if let Err(error) = &result {
            tracing::error!(id, error = %format!("{error:#}"), "delete failed");
          }
          status.set(status_line(
            "Could not delete task",
            &result
          ));
        }
      );
    })
  };

  // Either selector change re-applies
  // both filters.
  let apply_filter = {
    let manager = manager.clone();
    let list = list.dispatcher();
    let status = status.setter();

    Callback::from(
      move |(next_category, next_priority): (
        String,
        String
      )| {
        let filter =
          TaskFilter::from_selection(
            &next_category,
            &next_priority
          );
        let manager = manager.clone();
        let list = list.clone();
        let status = status.clone();
        wasm_bindgen_futures::spawn_local(
          async move {
            let result = manager
              .filter(&filter)
              .await;
            status.set(status_line(
              "Could not load tasks",
              &result
            ));
            match result {
              | Ok(tasks) => {
                list.dispatch(
                  ListAction::Show(tasks)
                );
              }
              | Err(error) => {
                tracing::error!(error = %format!("{error:#}"), "filter failed");
              }
            }
          }
        );
      }
    )
  };

  let on_priority_change = {
    let priority = priority.clone();
    let category = category.clone();
    let apply_filter =
      apply_filter.clone();
    Callback::from(
      move |e: web_sys::Event| {
        let select: web_sys::HtmlSelectElement =
          e.target_unchecked_into();
        let value = select.value();
        priority.set(value.clone());
        apply_filter.emit((
          (*category).clone(),
          value
        ));
      }
    )
  };

  let on_category_change = {
    let priority = priority.clone();
    let category = category.clone();
    let apply_filter =
      apply_filter.clone();
    Callback::from(
      move |e: web_sys::Event| {
        let select: web_sys::HtmlSelectElement =
          e.target_unchecked_into();
        let value = select.value();
        category.set(value.clone());
        apply_filter.emit((
          value,
          (*priority).clone()
        ));
      }
    )
  };

  let on_theme_toggle = {
    let theme = theme.setter();
    Callback::from(
      move |_: yew::MouseEvent| {
        let next =
          current_theme().toggled();
        apply_theme(next);
        theme.set(next);
      }
    )
  };

  let theme_label = match *theme {
    | Theme::Light => "Dark mode",
    | Theme::Dark => "Light mode"
  };

  html! {
      <div class="popup">
          <div class="header">
              <h1>{ "To-Do" }</h1>
              <button
                  id="theme-toggle-button"
                  class="btn"
                  onclick={on_theme_toggle}
              >
                  { theme_label }
              </button>
          </div>
          <TaskForm
              text={(*text).clone()}
              description={(*description).clone()}
              priority={(*priority).clone()}
              category={(*category).clone()}
              attachment={(*attachment).clone()}
              due_date={(*due_date).clone()}
              on_text_input={input_setter(&text)}
              on_description_input={textarea_setter(&description)}
              on_attachment_input={input_setter(&attachment)}
              on_due_date_input={input_setter(&due_date)}
              on_priority_change={on_priority_change}
              on_category_change={on_category_change}
              on_submit={on_submit}
          />
          {
              if let Some(message) = (*status).clone() {
                  html! { <div class="status error">{ message }</div> }
              } else {
                  html! {}
              }
          }
          <TaskList
              rows={list.view.rows().to_vec()}
              on_toggle={on_toggle}
              on_delete={on_delete}
          />
      </div>
  }
}

fn input_setter(
  state: &yew::UseStateHandle<String>
) -> Callback<web_sys::InputEvent> {
  let state = state.clone();
  Callback::from(
    move |e: web_sys::InputEvent| {
      let input: web_sys::HtmlInputElement =
        e.target_unchecked_into();
      state.set(input.value());
    }
  )
}

fn textarea_setter(
  state: &yew::UseStateHandle<String>
) -> Callback<web_sys::InputEvent> {
  let state = state.clone();
  Callback::from(
    move |e: web_sys::InputEvent| {
      let input: web_sys::HtmlTextAreaElement =
        e.target_unchecked_into();
      state.set(input.value());
    }
  )
}
