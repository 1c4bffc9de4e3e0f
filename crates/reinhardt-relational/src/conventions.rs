//! Model-building conventions.

use crate::error::Result;
use crate::model::Model;
use std::fmt;
use std::sync::Arc;

/// A convention reacting to model-building events.
///
/// Every hook defaults to doing nothing; a convention overrides the events it
/// cares about and is listed in the matching [`ConventionSet`] lists.
pub trait Convention: Send + Sync + fmt::Debug {
	/// Stable name used to locate and replace the convention.
	fn name(&self) -> &'static str;

	fn process_model_initialized(&self, _model: &mut Model) -> Result<()> {
		Ok(())
	}

	fn process_model_finalizing(&self, _model: &mut Model) -> Result<()> {
		Ok(())
	}

	fn process_model_finalized(&self, _model: &mut Model) -> Result<()> {
		Ok(())
	}
}

pub type ConventionList = Vec<Arc<dyn Convention>>;

/// Ordered conventions per model-building event.
#[derive(Debug, Default, Clone)]
pub struct ConventionSet {
	pub model_initialized: ConventionList,
	pub model_finalizing: ConventionList,
	pub model_finalized: ConventionList,
}

impl ConventionSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces the convention named `replaced` in place.
	///
	/// Appends `convention` when no convention of that name is present.
	/// Returns whether a replacement happened.
	pub fn replace_convention(
		list: &mut ConventionList,
		replaced: &str,
		convention: Arc<dyn Convention>,
	) -> bool {
		match list.iter().position(|c| c.name() == replaced) {
			Some(index) => {
				list[index] = convention;
				true
			}
			None => {
				list.push(convention);
				false
			}
		}
	}

	/// Appends `convention` unless a convention with the same name is listed.
	pub fn add_if_absent(list: &mut ConventionList, convention: Arc<dyn Convention>) {
		if !list.iter().any(|c| c.name() == convention.name()) {
			list.push(convention);
		}
	}

	pub fn remove_convention(list: &mut ConventionList, name: &str) -> bool {
		let before = list.len();
		list.retain(|c| c.name() != name);
		before != list.len()
	}

	pub fn names(list: &ConventionList) -> Vec<&'static str> {
		list.iter().map(|c| c.name()).collect()
	}

	pub fn initialize_model(&self, model: &mut Model) -> Result<()> {
		for convention in &self.model_initialized {
			tracing::trace!(convention = convention.name(), "model initialized");
			convention.process_model_initialized(model)?;
		}
		Ok(())
	}

	/// Runs the finalizing conventions, then the finalized ones.
	pub fn finalize_model(&self, model: &mut Model) -> Result<()> {
		for convention in &self.model_finalizing {
			tracing::trace!(convention = convention.name(), "model finalizing");
			convention.process_model_finalizing(model)?;
		}
		for convention in &self.model_finalized {
			tracing::trace!(convention = convention.name(), "model finalized");
			convention.process_model_finalized(model)?;
		}
		Ok(())
	}
}

pub trait ConventionSetBuilder: Send + Sync {
	fn create_convention_set(&self) -> ConventionSet;
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[derive(Debug)]
	struct Named(&'static str);

	impl Convention for Named {
		fn name(&self) -> &'static str {
			self.0
		}

		fn process_model_finalizing(&self, model: &mut Model) -> Result<()> {
			model.annotations.set(self.0, true);
			Ok(())
		}
	}

	#[rstest]
	fn test_replace_keeps_position() {
		let mut list: ConventionList = vec![Arc::new(Named("a")), Arc::new(Named("b")), Arc::new(Named("c"))];
		assert!(ConventionSet::replace_convention(&mut list, "b", Arc::new(Named("x"))));
		assert_eq!(ConventionSet::names(&list), vec!["a", "x", "c"]);
	}

	#[rstest]
	fn test_replace_appends_when_absent() {
		let mut list: ConventionList = vec![Arc::new(Named("a"))];
		assert!(!ConventionSet::replace_convention(&mut list, "missing", Arc::new(Named("x"))));
		assert_eq!(ConventionSet::names(&list), vec!["a", "x"]);
	}

	#[rstest]
	fn test_finalize_runs_hooks_in_order() {
		let set = ConventionSet {
			model_finalizing: vec![Arc::new(Named("first")), Arc::new(Named("second"))],
			..Default::default()
		};
		let mut model = Model::new();
		set.finalize_model(&mut model).unwrap();
		let names: Vec<_> = model.annotations.iter().map(|(k, _)| k.to_string()).collect();
		assert_eq!(names, vec!["first", "second"]);
	}
}
