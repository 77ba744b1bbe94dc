use mongodb::bson::oid::ObjectId;

use crate::{
    auth::Auth,
    entities::{profile::Profile, user::User},
};

pub trait AccessRules<Object, Subject> {
    fn get_access(&self, object: Object, subject: Subject) -> bool;
}

pub struct Read;

pub struct Edit;

impl<'a, 'b> AccessRules<&'a Auth, &'b User<ObjectId>> for Read {
    fn get_access(&self, auth: &'a Auth, user: &'b User<ObjectId>) -> bool {
        match auth {
            Auth::Admin(_) => true,
            Auth::User(_) => auth.id() == Some(user.id),
            Auth::None => false,
        }
    }
}

impl<'a, 'b> AccessRules<&'a Auth, &'b User<ObjectId>> for Edit {
    fn get_access(&self, auth: &'a Auth, _user: &'b User<ObjectId>) -> bool {
        matches!(auth, Auth::Admin(_))
    }
}

impl<'a, 'b> AccessRules<&'a Auth, &'b Profile<ObjectId>> for Edit {
    fn get_access(&self, auth: &'a Auth, profile: &'b Profile<ObjectId>) -> bool {
        match auth {
            Auth::Admin(_) => true,
            Auth::User(session) => profile.user_id.as_deref() == Some(session.id.as_str()),
            Auth::None => false,
        }
    }
}
