/// Text for the popup's error line after
/// a storage command. Any success clears
/// a message left by an earlier failure.
pub fn status_line<T>(
  failure: &str,
  result: &anyhow::Result<T>
) -> Option<String> {
  match result {
    | Ok(_) => None,
    | Err(error) => {
      Some(format!("{failure}: {error}"))
    }
  }
}

#[cfg(test)]
mod tests {
  use anyhow::anyhow;

  use super::status_line;

  #[test]
  fn success_clears_previous_failure() {
    let failed: anyhow::Result<()> =
      Err(anyhow!("quota exceeded"));
    assert_eq!(
      status_line(
        "Could not update task",
        &failed
      )
      .as_deref(),
      Some(
        "Could not update task: quota \
         exceeded"
      )
    );

    let toggled: anyhow::Result<()> =
      Ok(());
    assert_eq!(
      status_line(
        "Could not update task",
        &toggled
      ),
      None
    );

    let filtered: anyhow::Result<
      Vec<u64>
    > = Ok(vec![]);
    assert_eq!(
      status_line(
        "Could not load tasks",
        &filtered
      ),
      None
    );
  }
}
