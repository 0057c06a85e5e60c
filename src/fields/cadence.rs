use super::FieldAccessor;
use crate::activity::Activity;
use crate::models::Field;

/// Cadence as recorded. Most devices report running cadence in RPM; see
/// [`Activity::with_cadence_in_spm`] for strides per minute.
#[derive(Debug, Clone, Copy)]
pub struct Cadence<'a> {
    activity: &'a Activity,
}

impl<'a> FieldAccessor<'a> for Cadence<'a> {
    const FIELD: Field = Field::Cadence;

    fn activity(&self) -> &'a Activity {
        self.activity
    }
}

impl<'a> Cadence<'a> {
    pub(crate) fn new(activity: &'a Activity) -> Self {
        Self { activity }
    }
}
