use storyadmin_client::{
    media::Media,
    resource::decode,
    schema::{Field, FieldKind},
    ApiError, Resource, ResourceClient,
};
use storyadmin_common::time::{self, DateShift};

use crate::{
    form::{FormState, FormValue},
    route::Route,
    ControlError,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Phase {
    Loading,
    Loaded,
    Submitting,
    Saved,
    Failed(ApiError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submitted {
    Saved,
    /// The entity now exists, continue on its edit screen
    Created { id: String, route: Route },
}

/// Create or edit screen of one entity.
pub struct EditForm<R: Resource> {
    client: ResourceClient<R>,
    shift: DateShift,
    /// Id being edited, `None` on a create screen
    target: Option<String>,
    created: Option<String>,
    phase: Phase,
    entity: Option<R>,
    form: FormState,
}

impl<R: Resource> EditForm<R> {
    /// Create screen, starts from the resource's defaults.
    pub fn create(client: ResourceClient<R>, shift: DateShift) -> Self {
        Self {
            client,
            shift,
            target: None,
            created: None,
            phase: Phase::Loaded,
            entity: None,
            form: FormState::defaults(R::CREATE_FIELDS, shift, time::now()),
        }
    }

    /// Edit screen for `id`, not loaded yet.
    pub fn edit(client: ResourceClient<R>, id: &str, shift: DateShift) -> Self {
        Self {
            client,
            shift,
            target: Some(id.to_string()),
            created: None,
            phase: Phase::Loading,
            entity: None,
            form: FormState::default(),
        }
    }

    /// Edit screen for `id`, loaded. A failed load leaves the form in
    /// [`Phase::Failed`].
    pub async fn open(client: ResourceClient<R>, id: &str, shift: DateShift) -> Self {
        let mut form = Self::edit(client, id, shift);

        if let Err(err) = form.load().await {
            tracing::warn!(err = %err, "edit screen opened without an entity");
        }

        form
    }

    #[tracing::instrument(skip(self), fields(resource = R::PATH, id = ?self.target), err)]
    pub async fn load(&mut self) -> Result<(), ControlError> {
        let id = match &self.target {
            Some(id) => id.clone(),
            None => return Err(ControlError::NotReady("a create screen has nothing to load")),
        };

        self.phase = Phase::Loading;

        let loaded = match self.client.get_raw(&id).await {
            Ok(raw) => decode::<R>(raw.clone()).map(|entity| (raw, entity)),
            Err(err) => Err(err),
        };

        match loaded {
            Ok((raw, entity)) => {
                self.form = FormState::seed(R::UPDATE_FIELDS, &raw, self.shift, time::now());
                self.entity = Some(entity);
                self.phase = Phase::Loaded;

                Ok(())
            }
            Err(err) => {
                self.phase = Phase::Failed(err.clone());

                Err(err.into())
            }
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn entity(&self) -> Option<&R> {
        self.entity.as_ref()
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn fields(&self) -> &'static [Field] {
        match self.target {
            Some(_) => R::UPDATE_FIELDS,
            None => R::CREATE_FIELDS,
        }
    }

    pub fn is_create(&self) -> bool {
        self.target.is_none()
    }

    pub fn set(&mut self, name: &str, value: FormValue) -> Result<(), ControlError> {
        self.editable()?;

        self.form.set(name, value);
        self.touch();

        Ok(())
    }

    /// Operator input for `name`, read according to the field's kind.
    pub fn input(&mut self, name: &str, input: &str) -> Result<(), ControlError> {
        self.editable()?;

        if !self.fields().iter().any(|field| field.name == name) {
            tracing::warn!(field = name, "not an editable field, it will not be submitted");
        }

        self.form.input(self.fields(), name, input)?;
        self.touch();

        Ok(())
    }

    /// Puts an uploaded file into the resource's media field.
    pub fn attach(&mut self, media: Media) -> Result<(), ControlError> {
        let field = self
            .fields()
            .iter()
            .find(|field| field.kind == FieldKind::Media)
            .ok_or(ControlError::NotReady("this screen has no media field"))?;

        self.set(field.name, FormValue::Media(media))
    }

    #[tracing::instrument(skip(self), fields(resource = R::PATH, id = ?self.target), err)]
    pub async fn submit(&mut self) -> Result<Submitted, ControlError> {
        self.editable()?;

        let payload = self.form.to_payload(self.fields(), self.shift)?;

        self.phase = Phase::Submitting;

        let result = match &self.target {
            Some(id) => self.client.update(id, payload).await.map(|_| Submitted::Saved),
            None => self.client.create(payload).await.map(|id| Submitted::Created {
                route: Route::edit::<R>(&id),
                id,
            }),
        };

        match result {
            Ok(submitted) => {
                if let Submitted::Created { id, .. } = &submitted {
                    self.created = Some(id.clone());
                }

                tracing::info!("saved");
                self.phase = Phase::Saved;

                Ok(submitted)
            }
            Err(err) => {
                self.phase = Phase::Failed(err.clone());

                Err(err.into())
            }
        }
    }

    fn editable(&self) -> Result<(), ControlError> {
        match self.phase {
            Phase::Loading => return Err(ControlError::NotReady("still loading")),
            Phase::Submitting => return Err(ControlError::NotReady("a submit is in flight")),
            _ => {}
        }

        if self.target.is_some() && self.entity.is_none() {
            return Err(ControlError::NotReady("the entity could not be loaded"));
        }

        if self.created.is_some() {
            return Err(ControlError::NotReady("already created, continue on the edit screen"));
        }

        Ok(())
    }

    fn touch(&mut self) {
        if self.phase == Phase::Saved {
            self.phase = Phase::Loaded;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use storyadmin_client::{mock::MockTransport, Api, Category, Session, Story};

    use super::*;

    fn client<R: Resource>() -> ResourceClient<R> {
        Api::new("http://admin.test", Arc::new(MockTransport::default()), Session::in_memory())
            .unwrap()
            .resource()
    }

    #[test]
    fn create_screen_is_ready_at_once() {
        let mut form = EditForm::<Story>::create(client(), DateShift::NONE);

        assert!(form.is_create());
        assert_eq!(form.phase(), &Phase::Loaded);
        assert!(form.input("title", "Dragon").is_ok());
        assert_eq!(form.form().text("title"), Some("Dragon"));
    }

    #[test]
    fn edit_screen_waits_for_its_entity() {
        let mut form = EditForm::<Story>::edit(client(), "s1", DateShift::NONE);

        assert_eq!(form.phase(), &Phase::Loading);
        assert_eq!(
            form.input("title", "Dragon"),
            Err(ControlError::NotReady("still loading"))
        );
    }

    #[test]
    fn attach_needs_a_media_field() {
        let media = Media {
            file_id: "f1".into(),
            path: "/media/f1.png".into(),
        };

        let mut category = EditForm::<Category>::create(client(), DateShift::NONE);
        assert!(category.attach(media.clone()).is_err());

        let mut story = EditForm::<Story>::create(client(), DateShift::NONE);
        assert!(story.attach(media).is_err());
    }

    #[tokio::test]
    async fn create_screen_cannot_load() {
        let mut form = EditForm::<Story>::create(client(), DateShift::NONE);

        assert!(matches!(form.load().await, Err(ControlError::NotReady(_))));
    }
}
