use std::rc::Rc;

use taskpop_core::task::Task;
use taskpop_core::view::ListView;
use yew::Reducible;

#[derive(Clone, Default, PartialEq)]
pub struct ListState {
  pub view: ListView
}

pub enum ListAction {
  /// Clear the list, then render these
  /// tasks in order.
  Show(Vec<Task>),
  Append(Task),
  Remove(u64),
  SetCompleted(u64, bool)
}

impl Reducible for ListState {
  type Action = ListAction;

  fn reduce(
    self: Rc<Self>,
    action: Self::Action
  ) -> Rc<Self> {
    let mut view = self.view.clone();
    match action {
      | ListAction::Show(tasks) => {
        view.show(&tasks)
      }
      | ListAction::Append(task) => {
        view.append(&task)
      }
      | ListAction::Remove(id) => {
        view.remove(id)
      }
      | ListAction::SetCompleted(
        id,
        completed
      ) => view.set_completed(id, completed)
    }
    Rc::new(Self {
      view
    })
  }
}
